pub mod data_dir;
pub mod discovery;
pub mod table;

pub use data_dir::{DATA_DIR_ENV, ensure_file, resolve_data_dir};
pub use discovery::list_source_files;
pub use table::{
    integer_column, numeric_column, parse_f64, parse_i64, read_source_headers, read_source_table,
    string_column,
};
