use serde::Deserialize;

const DEFAULT_TEXT_START: u32 = 0x0001_0000;
const DEFAULT_DATA_START: u32 = 0x1000_0000;
const DEFAULT_SP_INIT: u32 = 0xBFFF_FFF0;
const DEFAULT_GP_INIT: u32 = 0x1000_8000;

/// Simulator configuration, loaded from TOML.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub memory: MemoryConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    /// Emit a trace event for every clock cycle.
    #[serde(default)]
    pub trace_cycles: bool,
}

#[derive(Debug, Deserialize)]
pub struct MemoryConfig {
    /// Address of the first program word, hex string.
    #[serde(default = "default_text_start")]
    pub text_start: String,

    /// Address of the data segment, hex string.
    #[serde(default = "default_data_start")]
    pub data_start: String,

    /// Initial stack pointer (x2), hex string.
    #[serde(default = "default_sp_init")]
    pub sp_init: String,

    /// Initial global pointer (x3), hex string.
    #[serde(default = "default_gp_init")]
    pub gp_init: String,
}

impl MemoryConfig {
    pub fn text_start_val(&self) -> u32 {
        parse_hex(&self.text_start, DEFAULT_TEXT_START)
    }

    pub fn data_start_val(&self) -> u32 {
        parse_hex(&self.data_start, DEFAULT_DATA_START)
    }

    pub fn sp_init_val(&self) -> u32 {
        parse_hex(&self.sp_init, DEFAULT_SP_INIT)
    }

    pub fn gp_init_val(&self) -> u32 {
        parse_hex(&self.gp_init, DEFAULT_GP_INIT)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { trace_cycles: false }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            text_start: default_text_start(),
            data_start: default_data_start(),
            sp_init: default_sp_init(),
            gp_init: default_gp_init(),
        }
    }
}

fn parse_hex(s: &str, default: u32) -> u32 {
    let s = s.trim_start_matches("0x");
    u32::from_str_radix(s, 16).unwrap_or(default)
}

fn default_text_start() -> String {
    format!("{DEFAULT_TEXT_START:#x}")
}

fn default_data_start() -> String {
    format!("{DEFAULT_DATA_START:#x}")
}

fn default_sp_init() -> String {
    format!("{DEFAULT_SP_INIT:#x}")
}

fn default_gp_init() -> String {
    format!("{DEFAULT_GP_INIT:#x}")
}
