fn main() -> anyhow::Result<()> {
    litepolis_db::app::run()
}
