use litepolis_db::prelude::*;
use litepolis_db::storage::Dialect;
use litepolis_db::Error;
use std::{thread, time::Duration};
use uuid::Uuid;

mod common;

#[test]
fn conversation_lifecycle() {
    for dialect in [Dialect::SQLITE, Dialect::STARROCKS] {
        let (_dir, db) = common::actor(dialect);
        let author = common::create_user(&db);

        let conversation = db
            .create_conversation(
                NewConversation::new("Test Conversation", author.id)
                    .with_description("This is a test conversation"),
            )
            .unwrap();
        assert_eq!(
            db.read_conversation(conversation.id).unwrap().unwrap(),
            conversation
        );

        let updated = db
            .update_conversation(
                conversation.id,
                author.id,
                ConversationUpdate {
                    title: Some("Updated Title".into()),
                    description: Some("Updated Description".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Updated Title");
        assert_eq!(updated.description.as_deref(), Some("Updated Description"));

        assert!(db.delete_conversation(conversation.id).unwrap());
        assert!(db.read_conversation(conversation.id).unwrap().is_none());
    }
}

#[test]
fn conversations_paginate_and_sort() {
    let (_dir, db) = common::actor(Dialect::SQLITE);
    let author = common::create_user(&db);
    for i in 0..15 {
        db.create_conversation(NewConversation::new(format!("Conversation {i:02}"), author.id))
            .unwrap();
    }

    let sort = Sort::new(ConversationSortField::Title, SortDirection::Asc);
    let page_one = db.list_conversations(Page::new(1, 10), sort).unwrap();
    let page_two = db.list_conversations(Page::new(2, 10), sort).unwrap();
    assert_eq!(page_one.len(), 10);
    assert_eq!(page_two.len(), 5);
    assert_eq!(page_one[0].title, "Conversation 00");
    assert_eq!(page_two[4].title, "Conversation 14");

    let by_title_desc = db
        .list_conversations(Page::new(1, 15), Sort::parse("title", "DESC"))
        .unwrap();
    assert_eq!(by_title_desc[0].title, "Conversation 14");

    assert_eq!(
        db.list_conversations_by_author(author.id, Page::new(1, 100))
            .unwrap()
            .len(),
        15
    );
    assert_eq!(db.count_conversations().unwrap(), 15);
}

#[test]
fn only_the_author_may_update() {
    let (_dir, db) = common::actor(Dialect::SQLITE);
    let author = common::create_user(&db);
    let other = common::create_user(&db);
    let conversation = db
        .create_conversation(NewConversation::new("Mine", author.id))
        .unwrap();

    let err = db
        .update_conversation(
            conversation.id,
            other.id,
            ConversationUpdate {
                is_archived: Some(true),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::UnauthorizedConversationUpdate { .. }));

    let err = db
        .update_conversation(Uuid::new_v4(), author.id, ConversationUpdate::default())
        .unwrap_err();
    assert!(matches!(err, Error::ConversationNotFound(_)));
}

#[test]
fn voting_flow_through_the_facade() {
    let (_dir, db) = common::actor(Dialect::SQLITE);
    let author = common::create_user(&db);
    let voter = common::create_user(&db);
    let conversation = db
        .create_conversation(NewConversation::new("Transit", author.id))
        .unwrap();

    let mut comments = Vec::new();
    for text in ["Buses should be free", "Trams at night", "More bike lanes"] {
        comments.push(
            db.create_comment(NewComment::new(text, author.id, conversation.id).approved(true))
                .unwrap(),
        );
        thread::sleep(Duration::from_millis(2));
    }

    let mut voted = Vec::new();
    while let Some(next) = db
        .read_next_unvoted_approved_comment(conversation.id, voter.id, &voted)
        .unwrap()
    {
        db.create_vote(NewVote {
            user_id: voter.id,
            comment_id: next.id,
            value: 1,
        })
        .unwrap();
        voted.push(next.id);
    }
    assert_eq!(voted, comments.iter().map(|c| c.id).collect::<Vec<_>>());

    let distribution = db.vote_value_distribution(comments[0].id).unwrap();
    assert_eq!(distribution.get(&1), Some(&1));
    assert_eq!(db.search_comments("bike").unwrap().len(), 1);

    db.create_user_cluster(NewUserCluster {
        user_id: voter.id,
        conversation_id: conversation.id,
        cluster: 0,
    })
    .unwrap();
    db.create_user_pca(NewUserPca {
        user_id: voter.id,
        conversation_id: conversation.id,
        x: 0.5,
        y: -0.5,
    })
    .unwrap();
    assert_eq!(
        db.list_user_clusters_by_conversation(conversation.id)
            .unwrap()
            .len(),
        1
    );
    assert!(db
        .read_user_pca_by_user_and_conversation(voter.id, conversation.id)
        .unwrap()
        .is_some());
}
