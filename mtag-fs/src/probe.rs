/// Host capabilities detected at process start. Environment faults are
/// raised eagerly against this struct rather than discovered mid-operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeCapabilities {
    pub filesystem: bool,
    pub threading: bool,
    pub streaming_seek: bool,
}

impl RuntimeCapabilities {
    /// Detects what the current process can do. Every native Rust target
    /// this workspace ships for has all three; the struct still exists so
    /// callers that embed this engine in a restricted host (e.g. a
    /// `wasm32-wasi` build without thread support) can probe before
    /// registering a worker pool.
    pub fn detect() -> Self {
        RuntimeCapabilities {
            filesystem: cfg!(not(target_arch = "wasm32")) || cfg!(target_os = "wasi"),
            threading: cfg!(not(all(target_arch = "wasm32", target_os = "unknown"))),
            streaming_seek: true,
        }
    }
}

impl Default for RuntimeCapabilities {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_target_has_full_capabilities() {
        let caps = RuntimeCapabilities::detect();
        assert!(caps.filesystem);
        assert!(caps.threading);
        assert!(caps.streaming_seek);
    }
}
