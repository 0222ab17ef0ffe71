//! Tax routing flags for an invoice.

use serde::{Deserialize, Serialize};

/// How GST is charged on an invoice.
///
/// `inter_state` only matters while `gst_applicable` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxMode {
    #[serde(default = "default_gst_applicable")]
    pub gst_applicable: bool,
    #[serde(default)]
    pub inter_state: bool,
}

fn default_gst_applicable() -> bool {
    true
}

impl Default for TaxMode {
    fn default() -> Self {
        Self::intra_state()
    }
}

impl TaxMode {
    /// GST split evenly into CGST and SGST.
    pub fn intra_state() -> Self {
        Self {
            gst_applicable: true,
            inter_state: false,
        }
    }

    /// GST charged wholly as IGST.
    pub fn inter_state() -> Self {
        Self {
            gst_applicable: true,
            inter_state: true,
        }
    }

    /// Bill of supply: no GST at all.
    pub fn without_gst() -> Self {
        Self {
            gst_applicable: false,
            inter_state: false,
        }
    }

    pub fn charges_igst(&self) -> bool {
        self.gst_applicable && self.inter_state
    }
}
