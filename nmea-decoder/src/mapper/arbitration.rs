//! Multi-source arbitration tables
//!
//! Some metrics are measurable by several message types at once. Each such
//! source carries a declared priority; the store lets a claimed field be
//! overwritten only by an equal-or-higher priority. Declared priority always
//! wins - delivery order never matters.

use crate::sentence::DepthReference;
use crate::types::SourceClaim;

/// Depth: a surface-referenced reading beats a transducer-referenced one,
/// which beats a keel-referenced one.
pub fn depth_claim(reference: DepthReference) -> SourceClaim {
    match reference {
        DepthReference::Surface => SourceClaim {
            source: "depth-surface",
            priority: 3,
        },
        DepthReference::Transducer => SourceClaim {
            source: "depth-transducer",
            priority: 2,
        },
        DepthReference::Keel => SourceClaim {
            source: "depth-keel",
            priority: 1,
        },
    }
}

/// Heading measured directly as true
pub fn heading_true_claim() -> SourceClaim {
    SourceClaim {
        source: "heading-true",
        priority: 3,
    }
}

/// Magnetic heading corrected with known deviation/variation
pub fn heading_corrected_claim() -> SourceClaim {
    SourceClaim {
        source: "heading-corrected",
        priority: 2,
    }
}

/// Raw magnetic heading, no correction available
pub fn heading_magnetic_claim() -> SourceClaim {
    SourceClaim {
        source: "heading-magnetic",
        priority: 1,
    }
}

/// Water temperature from a dedicated sentence or frame
pub fn water_temp_claim() -> SourceClaim {
    SourceClaim {
        source: "water-temp",
        priority: 2,
    }
}

/// Water temperature from a generic transducer tuple
pub fn water_temp_transducer_claim() -> SourceClaim {
    SourceClaim {
        source: "water-temp-xdr",
        priority: 1,
    }
}
