pub mod dedup;
pub mod formatter;
pub mod validator;
