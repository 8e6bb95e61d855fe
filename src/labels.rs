//! Class label table for the RealWaste model
//!
//! The order must match the output layer of the model the native engine
//! loads. Swapping the model means updating this table in the same change.

/// Total number of classes the model predicts
pub const NUM_CLASSES: usize = 9;

/// Class names indexed by the native engine's output class index
pub const CLASS_NAMES: [&str; NUM_CLASSES] = [
    "Cardboard",
    "Food Organics",
    "Glass",
    "Metal",
    "Miscellaneous Trash",
    "Paper",
    "Plastic",
    "Textile Trash",
    "Vegetation",
];

/// Get the class name for a raw native class index
///
/// Negative and too-large indices yield `None` instead of wrapping.
pub fn class_name(index: i32) -> Option<&'static str> {
    usize::try_from(index)
        .ok()
        .and_then(|i| CLASS_NAMES.get(i))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name() {
        assert_eq!(class_name(0), Some("Cardboard"));
        assert_eq!(class_name(8), Some("Vegetation"));
        assert_eq!(class_name(9), None);
    }

    #[test]
    fn test_negative_index_has_no_name() {
        assert_eq!(class_name(-1), None);
        assert_eq!(class_name(i32::MIN), None);
    }
}
