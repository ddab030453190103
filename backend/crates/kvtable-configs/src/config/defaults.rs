// Default value functions

pub fn default_table_name() -> String {
    "kvtable".to_string()
}

pub fn default_max_key_bytes() -> usize {
    1024 // remote store's partition/row key limit
}

pub fn default_request_timeout_ms() -> Option<u64> {
    None // no deadline unless configured
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}

pub fn default_log_file_path() -> String {
    "./logs/kvtable.log".to_string()
}

pub fn default_true() -> bool {
    true
}
