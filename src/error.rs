use core::alloc::Layout;

/// Errors reported by the fallible container operations.
///
/// Most operations either cannot fail or treat failure as a programmer error
/// and panic; `try_find` and `try_reserve` report through this type instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The key was not present in the container.
    #[error("key not found")]
    KeyNotFound,
    /// The requested bucket count or bucket storage does not fit in memory.
    #[error("capacity overflow")]
    CapacityOverflow,
    /// The allocator could not satisfy a request.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocFailed {
        /// The layout that could not be allocated.
        layout: Layout,
    },
}

impl Error {
    /// Aborts the way an infallible allocation path does.
    ///
    /// `AllocFailed` goes to [`alloc::alloc::handle_alloc_error`]; every other
    /// variant panics with its message.
    #[cold]
    pub(crate) fn fatal(self) -> ! {
        match self {
            Error::AllocFailed { layout } => alloc::alloc::handle_alloc_error(layout),
            other => panic!("{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(Error::KeyNotFound.to_string(), "key not found");
        assert_eq!(Error::CapacityOverflow.to_string(), "capacity overflow");

        let layout = Layout::from_size_align(64, 8).unwrap();
        assert_eq!(
            Error::AllocFailed { layout }.to_string(),
            "memory allocation of 64 bytes failed"
        );
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn test_fatal_panics_on_overflow() {
        Error::CapacityOverflow.fatal();
    }
}
