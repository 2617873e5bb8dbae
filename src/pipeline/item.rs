//! # Pipeline data item.

use crate::error::ItemError;

/// One unit of data moving through the pipeline.
///
/// `value` always equals `id`; it is carried so the receiver has something to
/// check the id against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: u64,
    pub value: u64,
}

impl Item {
    /// Builds the item for sequence number `id`.
    pub fn new(id: u64) -> Self {
        Self { id, value: id }
    }

    /// Checks the item against the last id the receiver accepted.
    ///
    /// Gaps are fine (drops and channel resets consume ids); going backwards is not.
    pub fn validate(&self, last: Option<u64>) -> Result<(), ItemError> {
        if self.id == 0 {
            return Err(ItemError::NonPositiveId);
        }
        if self.value != self.id {
            return Err(ItemError::ValueMismatch {
                id: self.id,
                value: self.value,
            });
        }
        match last {
            Some(last) if self.id <= last => Err(ItemError::OutOfOrder { id: self.id, last }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_mirrors_id() {
        assert_eq!(Item::new(9), Item { id: 9, value: 9 });
    }

    #[test]
    fn validation() {
        assert!(Item::new(1).validate(None).is_ok());
        assert!(Item::new(7).validate(Some(3)).is_ok());
        assert_eq!(Item::new(0).validate(None), Err(ItemError::NonPositiveId));
        assert_eq!(
            Item { id: 4, value: 5 }.validate(None),
            Err(ItemError::ValueMismatch { id: 4, value: 5 })
        );
        assert_eq!(
            Item::new(3).validate(Some(3)),
            Err(ItemError::OutOfOrder { id: 3, last: 3 })
        );
    }
}
