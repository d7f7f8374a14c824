
mod statement_parsing;


mod format;
