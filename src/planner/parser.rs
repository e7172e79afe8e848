use crate::{
    planner::{
        error::PrepareError,
        types::{MetaCommand, Statement},
    },
    types::row::{EMAIL_SIZE, Row, USERNAME_SIZE},
};

/// Parse a line starting with `.` into a meta command.
pub fn parse_meta_command(line: &str) -> Result<MetaCommand, PrepareError> {
    match line.trim() {
        ".exit" => Ok(MetaCommand::Exit),
        ".constants" => Ok(MetaCommand::Constants),
        ".btree" => Ok(MetaCommand::BTree),
        other => Err(PrepareError::UnrecognizedCommand(other.to_string())),
    }
}

/// Parse `insert <id> <username> <email>`, `select` or `select <id>`.
pub fn prepare_statement(line: &str) -> Result<Statement, PrepareError> {
    let line = line.trim();
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("insert") => prepare_insert(tokens),
        Some("select") => prepare_select(tokens),
        _ => Err(PrepareError::UnrecognizedStatement(line.to_string())),
    }
}

fn prepare_insert<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<Statement, PrepareError> {
    let (Some(id), Some(username), Some(email)) = (tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(PrepareError::SyntaxError);
    };
    if tokens.next().is_some() {
        return Err(PrepareError::SyntaxError);
    }

    let id = parse_id(id)?;
    if username.len() > USERNAME_SIZE || email.len() > EMAIL_SIZE {
        return Err(PrepareError::StringTooLong);
    }
    Ok(Statement::Insert(Row::new(id, username, email)))
}

fn prepare_select<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<Statement, PrepareError> {
    let id = tokens.next().map(parse_id).transpose()?;
    if tokens.next().is_some() {
        return Err(PrepareError::SyntaxError);
    }
    Ok(Statement::Select { id })
}

fn parse_id(token: &str) -> Result<u32, PrepareError> {
    match token.parse::<i64>() {
        Ok(id) if id < 0 => Err(PrepareError::NegativeId),
        Ok(id) => u32::try_from(id).map_err(|_| PrepareError::SyntaxError),
        Err(_) => Err(PrepareError::SyntaxError),
    }
}
