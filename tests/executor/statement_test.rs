use treedb::{
    executor::{ExecuteResult, execute_statement, insert::execute_insert, scan::execute_select},
    planner::{
        error::PrepareError,
        parser::prepare_statement,
        types::Statement,
    },
    types::{error::DatabaseError, row::Row},
    utils::mock::TempDatabase,
};

#[test]
fn test_prepare_insert() {
    assert_eq!(
        prepare_statement("insert 1 user1 person1@example.com"),
        Ok(Statement::Insert(Row::new(1, "user1", "person1@example.com")))
    );
}

#[test]
fn test_prepare_select() {
    assert_eq!(prepare_statement("select"), Ok(Statement::Select { id: None }));
    assert_eq!(
        prepare_statement("  select 42  "),
        Ok(Statement::Select { id: Some(42) })
    );
}

#[test]
fn test_prepare_errors() {
    assert_eq!(
        prepare_statement("insert -1 cstack foo@bar.com"),
        Err(PrepareError::NegativeId)
    );
    assert_eq!(prepare_statement("insert 1 only_two"), Err(PrepareError::SyntaxError));
    assert_eq!(prepare_statement("insert x a b"), Err(PrepareError::SyntaxError));
    assert_eq!(
        prepare_statement("update 1"),
        Err(PrepareError::UnrecognizedStatement("update 1".to_string()))
    );
}

#[test]
fn test_prepare_string_limits() {
    let max_username = "a".repeat(32);
    let max_email = "a".repeat(255);
    assert!(prepare_statement(&format!("insert 1 {} {}", max_username, max_email)).is_ok());

    let long_username = "a".repeat(33);
    assert_eq!(
        prepare_statement(&format!("insert 1 {} a@b", long_username)),
        Err(PrepareError::StringTooLong)
    );
    let long_email = "a".repeat(256);
    assert_eq!(
        prepare_statement(&format!("insert 1 a {}", long_email)),
        Err(PrepareError::StringTooLong)
    );
}

#[test]
fn test_error_messages() {
    assert_eq!(PrepareError::NegativeId.to_string(), "ID must be positive.");
    assert_eq!(PrepareError::StringTooLong.to_string(), "String is too long.");
    assert_eq!(
        PrepareError::SyntaxError.to_string(),
        "Syntax error. Could not parse statement."
    );
}

#[test]
fn test_insert_then_select() -> Result<(), DatabaseError> {
    let mut db = TempDatabase::with_prefix("insert_select")?;
    let table = db.open()?;

    let row = Row::new(1, "user1", "person1@example.com");
    assert_eq!(execute_insert(table, &row)?, ExecuteResult::Inserted);
    assert_eq!(execute_insert(table, &row)?, ExecuteResult::DuplicateKey);

    let result = execute_select(table, None)?;
    assert_eq!(result, ExecuteResult::Rows(vec![row.clone()]));
    assert_eq!(
        result.to_string(),
        "(1, user1, person1@example.com)\nExecuted."
    );

    assert_eq!(execute_select(table, Some(1))?, ExecuteResult::Rows(vec![row]));
    assert_eq!(execute_select(table, Some(2))?, ExecuteResult::Rows(vec![]));
    Ok(())
}

#[test]
fn test_execute_prepared_statements() -> Result<(), DatabaseError> {
    let mut db = TempDatabase::with_prefix("execute")?;
    let table = db.open()?;

    let lines = [
        "insert 2 b b@x",
        "insert 1 a a@x",
        "insert 2 c c@x",
        "select",
    ];
    let output: Vec<String> = lines
        .iter()
        .map(|line| {
            let statement = prepare_statement(line).unwrap();
            execute_statement(table, &statement).map(|result| result.to_string())
        })
        .collect::<Result<_, _>>()?;

    assert_eq!(
        output,
        vec![
            "Executed.".to_string(),
            "Executed.".to_string(),
            "Error: Duplicate key.".to_string(),
            "(1, a, a@x)\n(2, b, b@x)\nExecuted.".to_string(),
        ]
    );
    Ok(())
}
