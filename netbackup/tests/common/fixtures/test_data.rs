//! Common test data and constants

/// Documentation-range device addresses (RFC 5737)
pub mod hosts {
    pub const CORE_1: &str = "192.0.2.1";
    pub const CORE_2: &str = "192.0.2.2";
    pub const EDGE_1: &str = "192.0.2.3";
    pub const EDGE_2: &str = "192.0.2.4";
    pub const DOWN: &str = "192.0.2.99";
}

/// Transfer target used by the default test config
pub const TFTP_SERVER: &str = "198.51.100.10";

/// What a Cisco switch prints while pushing its config to TFTP
pub fn tftp_chatter(host_prompt: &str, filename: &str) -> String {
    format!(
        "{p}#terminal length 0\r\n{p}#copy run tftp\r\nAddress or name of remote host []? 198.51.100.10\r\n\
         Destination filename [{p}-confg]? {f}\r\n!!\r\n4107 bytes copied in 0.120 secs\r\n{p}#",
        p = host_prompt,
        f = filename
    )
}

/// Session output of `show running-config` split into arrival chunks
pub fn running_config_chunks(hostname: &str) -> Vec<String> {
    vec![
        format!("{h}#terminal length 0\r\n{h}#", h = hostname),
        "show running-config\r\nBuilding configuration...\r\n\r\n".to_string(),
        format!("Current configuration : 1024 bytes\r\n!\r\nhostname {h}\r\n!\r\n", h = hostname),
        format!("interface GigabitEthernet0/1\r\n description uplink\r\n!\r\nend\r\n\r\n{h}#", h = hostname),
    ]
}
