//! Transport kinds supported by overlay nodes.

/// Transport used by a node to listen and to contact peers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::VariantArray,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Transport {
    /// Stream transport over TCP.
    #[default]
    Tcp,
    /// Reliable datagram transport over UDP.
    Kcp,
}

impl Transport {
    /// Lowercase transport name, as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}
