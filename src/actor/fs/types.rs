//! File change kinds and how repeated events for one path combine.

use notify::EventKind;
use notify::event::ModifyKind;

/// What happened to a source file within one debounce window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

/// Result of folding a new event into the pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Merge {
    Keep,
    Replace(ChangeKind),
    /// Created then removed inside the window: nothing to rebuild.
    Discard,
}

impl ChangeKind {
    /// Map a notify event kind. Metadata-only changes (mtime, chmod) are
    /// ignored, since pipelines writing outputs would otherwise loop.
    pub(super) fn from_event(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Remove(_) => Some(Self::Removed),
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(Self::Modified),
            _ => None,
        }
    }

    /// Combine a pending change with a newer one for the same path.
    pub(super) fn merge(self, next: Self) -> Merge {
        match (self, next) {
            // Restored after a delete
            (Self::Removed, Self::Created | Self::Modified) => Merge::Replace(next),
            (Self::Modified, Self::Removed) => Merge::Replace(Self::Removed),
            (Self::Created, Self::Removed) => Merge::Discard,
            _ => Merge::Keep,
        }
    }

    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind};

    #[test]
    fn test_from_event() {
        assert_eq!(
            ChangeKind::from_event(&EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Created)
        );
        assert_eq!(
            ChangeKind::from_event(&EventKind::Modify(ModifyKind::Data(DataChange::Content))),
            Some(ChangeKind::Modified)
        );
        assert_eq!(
            ChangeKind::from_event(&EventKind::Remove(RemoveKind::File)),
            Some(ChangeKind::Removed)
        );
        assert_eq!(
            ChangeKind::from_event(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime))),
            None
        );
        assert_eq!(ChangeKind::from_event(&EventKind::Access(AccessKind::Any)), None);
    }

    #[test]
    fn test_merge_rules() {
        use ChangeKind::*;
        assert_eq!(Removed.merge(Created), Merge::Replace(Created));
        assert_eq!(Removed.merge(Modified), Merge::Replace(Modified));
        assert_eq!(Modified.merge(Removed), Merge::Replace(Removed));
        assert_eq!(Created.merge(Removed), Merge::Discard);
        assert_eq!(Created.merge(Modified), Merge::Keep);
        assert_eq!(Modified.merge(Modified), Merge::Keep);
    }
}
