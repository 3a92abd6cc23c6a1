pub mod histogram;
pub mod mutual_information;

pub use histogram::{entropy, JointHistogram};
pub use mutual_information::{mutual_information, nmi, nmi_with_bins, NmiMetric, DEFAULT_BINS};
