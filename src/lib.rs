pub mod importer;
pub mod numeric;
pub mod parser;
pub mod record;
pub mod row;
pub mod writer;
