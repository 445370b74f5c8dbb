//! Command keywords, field names and constants for lldpifmgrd

/// Show command used to collect per-interface LLDP state
pub const SHOW_LLDP_INTERFACE_CMD: &str = "show lldp interface detail";

/// Show command used to collect LLDP neighbors
pub const SHOW_LLDP_NEIGHBORS_CMD: &str = "show lldp neighbors detail";

/// Enter configuration mode on the device CLI
pub const CONFIGURE_TERMINAL_CMD: &str = "configure terminal";

/// Environment variable holding the config file path for the binary
pub const CONFIG_PATH_ENV: &str = "LLDPIFMGRD_CONFIG";

/// Field names used in raw interface facts
pub mod fields {
    pub const ENABLED: &str = "enabled";
    pub const RECEIVE: &str = "receive";
    pub const TLV_SELECT: &str = "tlv_select";
    pub const TRANSMIT: &str = "transmit";
}

/// Device command keywords
pub mod keywords {
    /// Interface context command
    pub const INTERFACE: &str = "interface";

    /// Negation prefix
    pub const NO: &str = "no";

    /// LLDP command root
    pub const LLDP: &str = "lldp";

    pub const RECEIVE: &str = "receive";
    pub const TRANSMIT: &str = "transmit";
    pub const TLV_SELECT: &str = "tlv-select";
}

/// Special constants
pub mod constants {
    /// Separator between TLV keywords in raw facts
    pub const TLV_SEPARATOR: char = ',';

    /// Raw facts value for an empty TLV selection
    pub const TLV_NONE: &str = "none";

    /// Values accepted as "on" in raw facts
    pub const TRUE_VALUES: &[&str] = &["true", "enabled", "up", "yes"];

    /// Values accepted as "off" in raw facts
    pub const FALSE_VALUES: &[&str] = &["false", "disabled", "down", "no"];
}
