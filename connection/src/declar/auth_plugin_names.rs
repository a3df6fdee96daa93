pub const MY_SQL_NATIVE_PASSWORD: &str = "mysql_native_password";
pub const CACHING_SHA2_PASSWORD: &str = "caching_sha2_password";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPlugin {
    MySqlNativePassword,
    CachingSha2Password,
}

impl AuthPlugin {
    pub fn from_name(name: &str) -> Option<AuthPlugin> {
        match name {
            MY_SQL_NATIVE_PASSWORD => Some(AuthPlugin::MySqlNativePassword),
            CACHING_SHA2_PASSWORD => Some(AuthPlugin::CachingSha2Password),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthPlugin::MySqlNativePassword => MY_SQL_NATIVE_PASSWORD,
            AuthPlugin::CachingSha2Password => CACHING_SHA2_PASSWORD,
        }
    }
}
