//! Schema changes and sequences through the adapter.

mod common;

use common::{column_rows, config, Script};
use oracle_enhanced_rs::{
    ColumnDefinition, EmulationFlags, Error, HostValue, LogicalType, TableOptions,
};

fn posts() -> Script {
    let script = Script::new();
    script.table("posts").respond(
        "FROM all_tab_columns WHERE owner = 'HR' AND table_name = 'POSTS'",
        column_rows(&[
            ("ID", "NUMBER", Some("38"), Some("0"), false, None),
            ("TITLE", "VARCHAR2", Some("100"), None, true, None),
            ("STATUS", "VARCHAR2", Some("20"), None, false, Some("'draft'")),
            ("BODY", "CLOB", None, None, true, None),
            ("COVER", "BLOB", None, None, true, None),
        ]),
    );
    script
}

#[tokio::test]
async fn test_create_table_with_sequence_start() {
    let script = Script::new();
    let mut adapter = script.adapter(config()).await;

    let columns = [
        ColumnDefinition::new("title", LogicalType::String).limit(100).not_null(),
        ColumnDefinition::new("body", LogicalType::Text).comment("Post body"),
    ];
    let options = TableOptions {
        sequence_start_value: Some(100),
        comment: Some("Blog posts".to_string()),
        ..TableOptions::default()
    };
    adapter.create_table("posts", &columns, &options).await.unwrap();

    assert_eq!(
        script.statements(),
        [
            "CREATE TABLE posts (id NUMBER(38) NOT NULL PRIMARY KEY, title VARCHAR2(100) NOT NULL, body CLOB)",
            "CREATE SEQUENCE posts_seq START WITH 100",
            "COMMENT ON TABLE posts IS 'Blog posts'",
            "COMMENT ON COLUMN posts.body IS 'Post body'",
        ]
    );

    // The first generated key is the start value.
    assert_eq!(adapter.next_sequence_value("posts_seq").await.unwrap(), 100);
    assert_eq!(adapter.next_sequence_value("posts_seq").await.unwrap(), 101);
}

#[tokio::test]
async fn test_sequence_start_falls_back_to_configured_default() {
    let script = Script::new();
    let mut adapter = script.adapter(config()).await;

    adapter
        .create_table("widgets", &[], &TableOptions::default())
        .await
        .unwrap();
    assert_eq!(adapter.next_sequence_value("widgets_seq").await.unwrap(), 10000);

    let script = Script::new();
    let flags = EmulationFlags {
        default_sequence_start_value: 500,
        ..EmulationFlags::default()
    };
    let mut adapter = script.adapter(config().with_flags(flags)).await;
    adapter
        .create_table("gadgets", &[], &TableOptions::default())
        .await
        .unwrap();
    assert_eq!(adapter.next_sequence_value("gadgets_seq").await.unwrap(), 500);
}

#[tokio::test]
async fn test_create_table_without_id() {
    let script = Script::new();
    let mut adapter = script.adapter(config()).await;

    let options = TableOptions {
        id: false,
        temporary: true,
        options: Some("ON COMMIT PRESERVE ROWS".to_string()),
        ..TableOptions::default()
    };
    adapter
        .create_table(
            "scratch",
            &[ColumnDefinition::new("amount", LogicalType::Decimal).precision(10, 2)],
            &options,
        )
        .await
        .unwrap();

    assert_eq!(
        script.statements(),
        ["CREATE GLOBAL TEMPORARY TABLE scratch (amount NUMBER(10,2)) ON COMMIT PRESERVE ROWS"]
    );
}

#[tokio::test]
async fn test_missing_sequence_is_an_error() {
    let script = Script::new();
    let mut adapter = script.adapter(config()).await;

    let result = adapter.next_sequence_value("nope_seq").await;

    assert!(matches!(result, Err(Error::Oracle { code: 2289, .. })));
}

#[tokio::test]
async fn test_drop_table_ignores_missing_sequence() {
    let script = Script::new();
    script.fail("DROP SEQUENCE", 2289);
    let mut adapter = script.adapter(config()).await;

    adapter.drop_table("posts", None).await.unwrap();

    assert_eq!(script.statements(), ["DROP TABLE posts", "DROP SEQUENCE posts_seq"]);
}

#[tokio::test]
async fn test_drop_table_error_propagates() {
    let script = Script::new();
    script.fail("DROP TABLE", 942);
    let mut adapter = script.adapter(config()).await;

    let result = adapter.drop_table("posts", Some("custom_seq")).await;

    assert!(matches!(result, Err(Error::Oracle { code: 942, .. })));
    assert_eq!(script.statements(), ["DROP TABLE posts"]);
}

#[tokio::test]
async fn test_rename_table_renames_sequence() {
    let script = Script::new();
    let mut adapter = script.adapter(config()).await;

    adapter.rename_table("posts", "articles").await.unwrap();

    assert_eq!(
        script.statements(),
        ["ALTER TABLE posts RENAME TO articles", "RENAME posts_seq TO articles_seq"]
    );
}

#[tokio::test]
async fn test_column_changes() {
    let script = Script::new();
    let mut adapter = script.adapter(config()).await;

    adapter
        .add_column(
            "posts",
            &ColumnDefinition::new("rating", LogicalType::Integer).comment("Stars"),
        )
        .await
        .unwrap();
    adapter.rename_column("posts", "rating", "stars").await.unwrap();
    adapter.remove_column("posts", "stars").await.unwrap();
    adapter.add_comment("posts", "title", "  ").await.unwrap();
    adapter.add_table_comment("posts", "It's all posts").await.unwrap();

    assert_eq!(
        script.statements(),
        [
            "ALTER TABLE posts ADD rating NUMBER(38)",
            "COMMENT ON COLUMN posts.rating IS 'Stars'",
            "ALTER TABLE posts RENAME COLUMN rating TO stars",
            "ALTER TABLE posts DROP COLUMN stars",
            "COMMENT ON TABLE posts IS 'It''s all posts'",
        ]
    );
}

#[tokio::test]
async fn test_change_column_only_emits_changed_nullability() {
    let script = posts();
    let mut adapter = script.adapter(config()).await;

    let title = ColumnDefinition::new("title", LogicalType::String).limit(200);
    adapter.change_column("posts", &title).await.unwrap();
    adapter.change_column("posts", &title.clone().not_null()).await.unwrap();
    let status = ColumnDefinition::new("status", LogicalType::String).limit(20);
    adapter.change_column("posts", &status).await.unwrap();

    let changes: Vec<String> = script
        .statements()
        .into_iter()
        .filter(|s| s.starts_with("ALTER TABLE"))
        .collect();
    assert_eq!(
        changes,
        [
            "ALTER TABLE posts MODIFY title VARCHAR2(200)",
            "ALTER TABLE posts MODIFY title VARCHAR2(200) NOT NULL",
            "ALTER TABLE posts MODIFY status VARCHAR2(20) NULL",
        ]
    );
}

#[tokio::test]
async fn test_change_unknown_column() {
    let script = posts();
    let mut adapter = script.adapter(config()).await;

    let result = adapter
        .change_column("posts", &ColumnDefinition::new("missing", LogicalType::String))
        .await;

    assert!(matches!(result, Err(Error::ColumnNotFound { .. })));
}

#[tokio::test]
async fn test_change_column_default() {
    let script = posts();
    let mut adapter = script.adapter(config()).await;

    adapter
        .change_column_default("posts", "status", &HostValue::from("draft"))
        .await
        .unwrap();
    adapter
        .change_column_default("posts", "status", &HostValue::Null)
        .await
        .unwrap();
    adapter
        .change_column_default("posts", "body", &HostValue::from("placeholder"))
        .await
        .unwrap();
    adapter
        .change_column_default("posts", "cover", &HostValue::from(vec![1_u8]))
        .await
        .unwrap();
    let missing = adapter
        .change_column_default("posts", "missing", &HostValue::from("x"))
        .await;
    assert!(matches!(missing, Err(Error::ColumnNotFound { .. })));

    let changes: Vec<String> = script
        .statements()
        .into_iter()
        .filter(|s| s.starts_with("ALTER TABLE"))
        .collect();
    assert_eq!(
        changes,
        [
            "ALTER TABLE posts MODIFY status DEFAULT 'draft'",
            "ALTER TABLE posts MODIFY status DEFAULT NULL",
            "ALTER TABLE posts MODIFY body DEFAULT EMPTY_CLOB()",
            "ALTER TABLE posts MODIFY cover DEFAULT EMPTY_BLOB()",
        ]
    );
}

#[tokio::test]
async fn test_indexes() {
    let script = Script::new();
    let mut adapter = script.adapter(config()).await;

    adapter.add_index("posts", &["title"], None, false).await.unwrap();
    adapter
        .add_index("posts", &["title", "status"], Some("posts_uk"), true)
        .await
        .unwrap();
    adapter.remove_index("posts_uk").await.unwrap();

    let too_long = "index_with_a_name_longer_than_thirty";
    let result = adapter.add_index("posts", &["title"], Some(too_long), false).await;
    assert!(matches!(result, Err(Error::InvalidIdentifier { .. })));

    assert_eq!(
        script.statements(),
        [
            "CREATE INDEX index_posts_on_title ON posts (title)",
            "CREATE UNIQUE INDEX posts_uk ON posts (title, status)",
            "DROP INDEX posts_uk",
        ]
    );
}
