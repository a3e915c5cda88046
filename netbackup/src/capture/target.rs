use std::fmt;

/// Login shared by every device in the inventory. Never mutated after load;
/// each capture gets its own [`DeviceTarget`].
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
    port: u16,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>, port: u16) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            port,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn target_for(&self, host: &str) -> DeviceTarget {
        DeviceTarget {
            host: host.to_string(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct DeviceTarget {
    host: String,
    port: u16,
    username: String,
    password: String,
}

impl DeviceTarget {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for DeviceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
