//! Default values for configuration fields

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_port() -> u16 {
    8080
}

pub fn default_database_url() -> String {
    "sqlite://./step-relay.db".to_string()
}

pub fn default_timezone() -> String {
    "Asia/Shanghai".to_string()
}

pub fn default_tick_interval() -> String {
    "30s".to_string()
}

pub fn default_runner_interval() -> String {
    "5s".to_string()
}

pub fn default_misfire_grace() -> String {
    "1h".to_string()
}

pub fn default_max_concurrent_jobs() -> usize {
    4
}

pub fn default_endpoint() -> String {
    "http://8.140.250.130/king/api/step".to_string()
}

pub fn default_submission_timeout() -> String {
    "30s".to_string()
}

pub fn default_auth_token() -> String {
    "5aa77abb20f11a5e7f2440747a655a55".to_string()
}

pub fn default_time_token() -> String {
    "1772274234275".to_string()
}
