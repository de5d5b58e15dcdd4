use serde::{Deserialize, Serialize};
use std::fmt;

/// Air pollution severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityCategory {
    Baik,
    Sedang,
    TidakSehatBagiKelompokSensitif,
    TidakSehat,
    SangatTidakSehat,
    Berbahaya,
}

impl SeverityCategory {
    /// All categories, least severe first.
    pub const ALL: [SeverityCategory; 6] = [
        SeverityCategory::Baik,
        SeverityCategory::Sedang,
        SeverityCategory::TidakSehatBagiKelompokSensitif,
        SeverityCategory::TidakSehat,
        SeverityCategory::SangatTidakSehat,
        SeverityCategory::Berbahaya,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SeverityCategory::Baik => "Baik",
            SeverityCategory::Sedang => "Sedang",
            SeverityCategory::TidakSehatBagiKelompokSensitif => {
                "Tidak Sehat bagi Kelompok Sensitif"
            }
            SeverityCategory::TidakSehat => "Tidak Sehat",
            SeverityCategory::SangatTidakSehat => "Sangat Tidak Sehat",
            SeverityCategory::Berbahaya => "Berbahaya",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        SeverityCategory::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for SeverityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
