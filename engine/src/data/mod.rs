// Market data input: daily bar loading
pub mod csv_parser;
