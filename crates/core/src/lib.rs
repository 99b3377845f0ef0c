pub mod analysis;
pub mod asset;
pub mod extract;
pub mod mock;
pub mod validate;

pub use analysis::*;
pub use asset::{AssetError, AssetId, AssetRegistry, ImageFormat, PhotoAsset};
pub use extract::{ParseError, parse_analysis_text, parse_analysis_value};
pub use mock::mock_result;
pub use validate::{SchemaViolation, validate_result};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
