//! Query-building helpers shared by the managers: pagination, whitelisted
//! ordering, substring patterns and partial-update assignments.

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// One page of an `OFFSET/LIMIT` listing.
///
/// Out-of-range input is normalised rather than rejected: a page below 1
/// becomes 1 and a page size below 1 becomes the default. Deserialized
/// pages go through the same normalisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPage")]
pub struct Page {
    page: i64,
    page_size: i64,
}

#[derive(Deserialize)]
struct RawPage {
    #[serde(default = "first_page")]
    page: i64,
    #[serde(default = "default_page_size")]
    page_size: i64,
}

fn first_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl From<RawPage> for Page {
    fn from(raw: RawPage) -> Self {
        Page::new(raw.page, raw.page_size)
    }
}

impl Page {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: if page < 1 { 1 } else { page },
            page_size: if page_size < 1 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Only a case-insensitive `asc` sorts ascending; anything else is
    /// descending.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A column a listing may be ordered by.
pub trait SortField: Copy + Default {
    fn column(&self) -> &'static str;
    fn from_column(name: &str) -> Option<Self>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sort<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: SortField> Sort<F> {
    pub fn new(field: F, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Unknown column names fall back to the field's default.
    pub fn parse(order_by: &str, order_direction: &str) -> Self {
        let field = F::from_column(order_by.trim()).unwrap_or_else(|| {
            log::debug!("unknown sort column '{}', using default", order_by);
            F::default()
        });
        Self {
            field,
            direction: SortDirection::parse(order_direction),
        }
    }

    /// `ORDER BY` body; ties are broken by id so pages stay stable.
    pub fn order_clause(&self) -> String {
        let dir = self.direction.as_sql();
        format!("{} {dir}, id {dir}", self.field.column())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommentSortField {
    #[default]
    Created,
    Modified,
    Content,
    Approved,
    UserId,
}

impl SortField for CommentSortField {
    fn column(&self) -> &'static str {
        match self {
            CommentSortField::Created => "created",
            CommentSortField::Modified => "modified",
            CommentSortField::Content => "content",
            CommentSortField::Approved => "approved",
            CommentSortField::UserId => "user_id",
        }
    }

    fn from_column(name: &str) -> Option<Self> {
        match name {
            "created" => Some(CommentSortField::Created),
            "modified" => Some(CommentSortField::Modified),
            "content" => Some(CommentSortField::Content),
            "approved" => Some(CommentSortField::Approved),
            "user_id" => Some(CommentSortField::UserId),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConversationSortField {
    #[default]
    Created,
    Modified,
    Title,
    IsArchived,
    DisplayUnmoderated,
}

impl SortField for ConversationSortField {
    fn column(&self) -> &'static str {
        match self {
            ConversationSortField::Created => "created",
            ConversationSortField::Modified => "modified",
            ConversationSortField::Title => "title",
            ConversationSortField::IsArchived => "is_archived",
            ConversationSortField::DisplayUnmoderated => "display_unmoderated",
        }
    }

    fn from_column(name: &str) -> Option<Self> {
        match name {
            "created" => Some(ConversationSortField::Created),
            "modified" => Some(ConversationSortField::Modified),
            "title" => Some(ConversationSortField::Title),
            "is_archived" => Some(ConversationSortField::IsArchived),
            "display_unmoderated" => Some(ConversationSortField::DisplayUnmoderated),
            _ => None,
        }
    }
}

/// `LIKE` pattern matching `query` anywhere in the column. Use with
/// `ESCAPE '\'`.
pub fn like_pattern(query: &str) -> String {
    let mut out = String::with_capacity(query.len() + 2);
    out.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// `SET` list of a partial update. Only fields that were provided end up in
/// the statement.
#[derive(Debug, Default)]
pub struct Assignments {
    columns: Vec<&'static str>,
    values: Vec<Value>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<V: Into<Value>>(&mut self, column: &'static str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.columns.push(column);
            self.values.push(v.into());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// `UPDATE <table> SET a = ?1, b = ?2 WHERE id = ?3`
    pub fn update_sql(&self, table: &str) -> String {
        let sets = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "UPDATE {table} SET {sets} WHERE id = ?{}",
            self.columns.len() + 1
        )
    }

    /// Bound values in statement order, with the row id last.
    pub fn into_params(self, id: Value) -> Vec<Value> {
        let mut values = self.values;
        values.push(id);
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_normalises_out_of_range_input() {
        let p = Page::new(0, 0);
        assert_eq!(p.page(), 1);
        assert_eq!(p.page_size(), DEFAULT_PAGE_SIZE);

        let p = Page::new(-3, -1);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 10);
    }

    #[test]
    fn deserialized_page_is_normalised() {
        let p: Page = serde_json::from_str(r#"{"page":1,"page_size":-1}"#).unwrap();
        assert_eq!(p.limit(), DEFAULT_PAGE_SIZE);

        let p: Page = serde_json::from_str(r#"{"page":-4,"page_size":0}"#).unwrap();
        assert_eq!(p, Page::default());

        let p: Page = serde_json::from_str("{}").unwrap();
        assert_eq!(p, Page::default());

        let p: Page = serde_json::from_str(r#"{"page":3,"page_size":5}"#).unwrap();
        assert_eq!((p.page(), p.page_size(), p.offset()), (3, 5, 10));
    }

    #[test]
    fn page_offset_calculation() {
        assert_eq!(Page::new(1, 10).offset(), 0);
        assert_eq!(Page::new(2, 10).offset(), 10);
        assert_eq!(Page::new(3, 25).offset(), 50);
    }

    #[test]
    fn direction_is_ascending_only_for_asc() {
        assert_eq!(SortDirection::parse("asc"), SortDirection::Asc);
        assert_eq!(SortDirection::parse("ASC"), SortDirection::Asc);
        assert_eq!(SortDirection::parse("desc"), SortDirection::Desc);
        assert_eq!(SortDirection::parse("sideways"), SortDirection::Desc);
    }

    #[test]
    fn sort_falls_back_to_created() {
        let sort: Sort<CommentSortField> = Sort::parse("password; DROP TABLE users", "asc");
        assert_eq!(sort.field, CommentSortField::Created);
        assert_eq!(sort.order_clause(), "created ASC, id ASC");
    }

    #[test]
    fn sort_accepts_whitelisted_columns() {
        let sort: Sort<ConversationSortField> = Sort::parse("title", "desc");
        assert_eq!(sort.field, ConversationSortField::Title);
        assert_eq!(sort.order_clause(), "title DESC, id DESC");

        let sort: Sort<CommentSortField> = Sort::parse("user_id", "asc");
        assert_eq!(sort.field, CommentSortField::UserId);
        assert_eq!(sort.order_clause(), "user_id ASC, id ASC");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("needle"), "%needle%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn assignments_skip_missing_fields() {
        let mut set = Assignments::new();
        set.set("title", Some("new".to_string()))
            .set::<String>("description", None)
            .set("is_archived", Some(true));
        assert!(!set.is_empty());
        assert_eq!(
            set.update_sql("conversations"),
            "UPDATE conversations SET title = ?1, is_archived = ?2 WHERE id = ?3"
        );
        let params = set.into_params(Value::Text("id".into()));
        assert_eq!(params.len(), 3);
        assert_eq!(params[1], Value::Integer(1));
    }

    #[test]
    fn empty_assignments() {
        let set = Assignments::new();
        assert!(set.is_empty());
    }
}
