//! Backend selection.
//!
//! The same source is compiled into the build script, which runs [`select`] against the target
//! being built and turns the result into `cfg` flags, and into the library, where [`Backend`]
//! reports the outcome.

use std::error::Error;
use std::fmt::{self, Display};
use std::str::FromStr;

/// Architecture families whose hardware never reorders stores with other stores or loads with
/// other loads, so an acquire or release fence only needs to restrain the compiler.
const STORE_ORDERED_ARCHS: &[&str] = &["x86", "x86_64"];

/// Architecture families that need a hardware barrier instruction to order memory accesses.
const WEAKLY_ORDERED_ARCHS: &[&str] = &[
    "aarch64",
    "arm",
    "arm64ec",
    "loongarch64",
    "mips",
    "mips64",
    "powerpc",
    "powerpc64",
    "riscv32",
    "riscv64",
    "s390x",
    "sparc64",
];

/// The implementation backing [`AtomicPointer`](crate::AtomicPointer).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Backend {
    /// Relaxed word accesses ordered by explicit fences.
    Fence(FenceKind),
    /// A platform atomic word with acquire and release orderings.
    Native,
}

/// The fence provider used by [`Backend::Fence`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FenceKind {
    /// A fence that emits no instruction on store-ordered hardware.
    Compiler,
    /// A full hardware memory barrier.
    Hardware,
}

/// How the build should choose among the available backends.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Preference {
    /// The fence-based backend if the target has a fence provider, the native one otherwise.
    #[default]
    Auto,
    /// The fence-based backend, or nothing.
    Fence,
    /// The native-atomic backend, or nothing.
    Native,
}

/// The properties of a compilation target relevant to backend selection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Target {
    /// The value of `cfg(target_arch)`.
    pub arch: String,
    /// `true` if the target has a complete pointer-width atomics facility.
    pub pointer_atomics: bool,
    /// `true` if a pointer-width word can at least be loaded and stored atomically.
    pub pointer_load_store: bool,
}

/// A capability whose absence prevents a backend from being selected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Capability {
    /// No known fence provider exists for the architecture.
    FenceProvider,
    /// The target lacks pointer-width atomics.
    PointerAtomics,
    /// Neither a fence provider nor pointer-width atomics are available.
    AnyBackend,
}

/// No backend satisfies the target and the preference.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Unsupported {
    /// The target architecture.
    pub arch: String,
    /// The capability that is missing.
    pub missing: Capability,
}

/// The configured preference could not be parsed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvalidPreference(pub String);

impl Backend {
    /// Returns the name of the backend.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_pointer::{Backend, FenceKind};
    ///
    /// assert_eq!(Backend::Native.name(), "native");
    /// assert_eq!(Backend::Fence(FenceKind::Hardware).name(), "fence-hardware");
    /// ```
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Backend::Fence(FenceKind::Compiler) => "fence-compiler",
            Backend::Fence(FenceKind::Hardware) => "fence-hardware",
            Backend::Native => "native",
        }
    }

    /// Returns the `cfg` key-value pairs that select this backend at compile time.
    #[must_use]
    pub const fn cfgs(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Backend::Fence(FenceKind::Compiler) => &[
                ("atomic_pointer_backend", "fence"),
                ("atomic_pointer_fence", "compiler"),
            ],
            Backend::Fence(FenceKind::Hardware) => &[
                ("atomic_pointer_backend", "fence"),
                ("atomic_pointer_fence", "hardware"),
            ],
            Backend::Native => &[("atomic_pointer_backend", "native")],
        }
    }
}

impl Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preference {
    type Err = InvalidPreference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "auto" => Ok(Preference::Auto),
            "fence" => Ok(Preference::Fence),
            "native" => Ok(Preference::Native),
            other => Err(InvalidPreference(other.to_owned())),
        }
    }
}

impl Target {
    /// Describes a target from the values Cargo passes to build scripts.
    ///
    /// `has_atomic` and `has_atomic_load_store` are the comma-separated contents of
    /// `CARGO_CFG_TARGET_HAS_ATOMIC` and `CARGO_CFG_TARGET_HAS_ATOMIC_LOAD_STORE`.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_pointer::select::Target;
    ///
    /// let target = Target::from_cargo_cfg("aarch64", Some("8,16,32,64,128,ptr"), None);
    /// assert!(target.pointer_atomics);
    /// assert!(target.pointer_load_store);
    /// ```
    #[must_use]
    pub fn from_cargo_cfg(
        arch: &str,
        has_atomic: Option<&str>,
        has_atomic_load_store: Option<&str>,
    ) -> Self {
        let lists_ptr = |list: Option<&str>| {
            list.map_or(false, |l| l.split(',').any(|width| width.trim() == "ptr"))
        };
        let pointer_atomics = lists_ptr(has_atomic);
        Self {
            arch: arch.to_owned(),
            pointer_atomics,
            pointer_load_store: pointer_atomics || lists_ptr(has_atomic_load_store),
        }
    }

    /// Returns the fence provider available for the target, if any.
    ///
    /// A fence provider is useless without atomic word accesses, so `None` is returned in that
    /// case as well.
    #[must_use]
    pub fn fence_kind(&self) -> Option<FenceKind> {
        if !self.pointer_load_store {
            return None;
        }
        let arch = self.arch.as_str();
        if STORE_ORDERED_ARCHS.contains(&arch) {
            Some(FenceKind::Compiler)
        } else if WEAKLY_ORDERED_ARCHS.contains(&arch) {
            Some(FenceKind::Hardware)
        } else {
            None
        }
    }
}

/// Chooses exactly one backend for `target`.
///
/// # Errors
///
/// Returns [`Unsupported`] if no backend allowed by `preference` is available. The selection
/// never falls back to a backend the preference excludes.
///
/// # Examples
///
/// ```
/// use atomic_pointer::select::{select, Capability, Preference, Target};
/// use atomic_pointer::{Backend, FenceKind};
///
/// let x86_64 = Target::from_cargo_cfg("x86_64", Some("8,16,32,64,ptr"), None);
/// assert_eq!(select(&x86_64, Preference::Auto), Ok(Backend::Fence(FenceKind::Compiler)));
/// assert_eq!(select(&x86_64, Preference::Native), Ok(Backend::Native));
///
/// let avr = Target::from_cargo_cfg("avr", Some("8"), None);
/// assert_eq!(select(&avr, Preference::Auto).unwrap_err().missing, Capability::AnyBackend);
/// ```
pub fn select(target: &Target, preference: Preference) -> Result<Backend, Unsupported> {
    let fence = target.fence_kind().map(Backend::Fence);
    let native = target.pointer_atomics.then_some(Backend::Native);
    let (chosen, missing) = match preference {
        Preference::Auto => (fence.or(native), Capability::AnyBackend),
        Preference::Fence => (fence, Capability::FenceProvider),
        Preference::Native => (native, Capability::PointerAtomics),
    };
    chosen.ok_or_else(|| Unsupported {
        arch: target.arch.clone(),
        missing,
    })
}

/// The environment variable that overrides the `native` feature.
pub const BACKEND_VAR: &str = "ATOMIC_POINTER_BACKEND";

/// The outcome of [`configure`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Selection {
    /// The selected backend.
    pub backend: Backend,
    /// The preference the backend was selected with.
    pub preference: Preference,
    /// `true` if the preference was set by [`BACKEND_VAR`] or the `native` feature.
    pub explicit: bool,
}

/// Selects a backend from the variables Cargo sets for build scripts.
///
/// `var` returns the value of an environment variable, or `None` if it is not set.
///
/// # Errors
///
/// Returns an error if the target architecture is not set, if [`BACKEND_VAR`] holds an
/// [`InvalidPreference`], or if the target is [`Unsupported`]. The build script fails the build
/// on any of them.
///
/// # Examples
///
/// ```
/// use atomic_pointer::select::configure;
/// use atomic_pointer::Backend;
///
/// let selection = configure(|var| match var {
///     "CARGO_CFG_TARGET_ARCH" => Some("wasm32".to_owned()),
///     "CARGO_CFG_TARGET_HAS_ATOMIC" => Some("8,16,32,64,ptr".to_owned()),
///     _ => None,
/// })
/// .unwrap();
/// assert_eq!(selection.backend, Backend::Native);
/// assert!(!selection.explicit);
///
/// assert!(configure(|var| (var == "CARGO_CFG_TARGET_ARCH").then(|| "avr".to_owned())).is_err());
/// ```
pub fn configure<V: Fn(&str) -> Option<String>>(var: V) -> Result<Selection, Box<dyn Error>> {
    let arch = var("CARGO_CFG_TARGET_ARCH").ok_or("CARGO_CFG_TARGET_ARCH is not set")?;
    let has_atomic = var("CARGO_CFG_TARGET_HAS_ATOMIC");
    let has_atomic_load_store = var("CARGO_CFG_TARGET_HAS_ATOMIC_LOAD_STORE");
    let target = Target::from_cargo_cfg(
        &arch,
        has_atomic.as_deref(),
        has_atomic_load_store.as_deref(),
    );

    let (preference, explicit) = match var(BACKEND_VAR) {
        Some(value) => (value.parse::<Preference>()?, true),
        None if var("CARGO_FEATURE_NATIVE").is_some() => (Preference::Native, true),
        None => (Preference::Auto, false),
    };

    Ok(Selection {
        backend: select(&target, preference)?,
        preference,
        explicit,
    })
}

impl Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no AtomicPointer backend for target architecture `{}`: ",
            self.arch
        )?;
        match self.missing {
            Capability::FenceProvider => f.write_str(
                "the fence-based backend was requested but no fence provider is known for this \
                 architecture; unset ATOMIC_POINTER_BACKEND or set it to `native`, or add the \
                 architecture to the fence provider table",
            ),
            Capability::PointerAtomics => f.write_str(
                "the native-atomic backend was requested but the target has no pointer-width \
                 atomics; unset ATOMIC_POINTER_BACKEND or set it to `fence`, and disable the \
                 `native` feature",
            ),
            Capability::AnyBackend => f.write_str(
                "the target has neither a known fence provider nor pointer-width atomics; add \
                 a fence provider for this architecture before using the crate on it",
            ),
        }
    }
}

impl Error for Unsupported {}

impl Display for InvalidPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid ATOMIC_POINTER_BACKEND value `{}`: expected `auto`, `fence`, or `native`",
            self.0
        )
    }
}

impl Error for InvalidPreference {}

#[cfg(test)]
mod test {
    use super::*;

    fn target(arch: &str, has_atomic: &str) -> Target {
        Target::from_cargo_cfg(arch, Some(has_atomic), None)
    }

    #[test]
    fn store_ordered_targets_prefer_compiler_fence() {
        for arch in ["x86", "x86_64"] {
            let t = target(arch, "8,16,32,64,ptr");
            assert_eq!(
                select(&t, Preference::Auto),
                Ok(Backend::Fence(FenceKind::Compiler))
            );
        }
    }

    #[test]
    fn weakly_ordered_targets_prefer_hardware_fence() {
        for arch in WEAKLY_ORDERED_ARCHS {
            let t = target(arch, "8,16,32,ptr");
            assert_eq!(
                select(&t, Preference::Auto),
                Ok(Backend::Fence(FenceKind::Hardware))
            );
        }
    }

    #[test]
    fn unknown_arch_falls_to_native() {
        let t = target("wasm32", "8,16,32,64,ptr");
        assert_eq!(select(&t, Preference::Auto), Ok(Backend::Native));
    }

    #[test]
    fn load_store_only_target() {
        // thumbv6m: atomic loads and stores, no read-modify-write.
        let t = Target::from_cargo_cfg("arm", None, Some("8,16,32,ptr"));
        assert!(!t.pointer_atomics);
        assert!(t.pointer_load_store);
        assert_eq!(
            select(&t, Preference::Auto),
            Ok(Backend::Fence(FenceKind::Hardware))
        );
        assert_eq!(
            select(&t, Preference::Native).unwrap_err().missing,
            Capability::PointerAtomics
        );
    }

    #[test]
    fn no_backend_is_a_hard_failure() {
        let t = Target::from_cargo_cfg("avr", Some("8"), None);
        for _ in 0..4 {
            let err = select(&t, Preference::Auto).unwrap_err();
            assert_eq!(err.arch, "avr");
            assert_eq!(err.missing, Capability::AnyBackend);
            let message = err.to_string();
            assert!(message.contains("`avr`"));
            assert!(message.contains("neither a known fence provider nor pointer-width atomics"));
        }
    }

    #[test]
    fn forced_fence_never_falls_back() {
        let t = target("wasm32", "8,16,32,64,ptr");
        let err = select(&t, Preference::Fence).unwrap_err();
        assert_eq!(err.missing, Capability::FenceProvider);
        assert!(err.to_string().contains("no fence provider"));
    }

    #[test]
    fn fence_requires_atomic_word() {
        let t = Target::from_cargo_cfg("riscv32", None, None);
        assert_eq!(t.fence_kind(), None);
        assert!(select(&t, Preference::Fence).is_err());
    }

    #[test]
    fn preference_parsing() {
        assert_eq!("".parse(), Ok(Preference::Auto));
        assert_eq!("auto".parse(), Ok(Preference::Auto));
        assert_eq!(" fence ".parse(), Ok(Preference::Fence));
        assert_eq!("native".parse(), Ok(Preference::Native));
        let err = "cstdatomic".parse::<Preference>().unwrap_err();
        assert_eq!(err, InvalidPreference("cstdatomic".to_owned()));
        assert!(err.to_string().contains("`cstdatomic`"));
    }

    fn env<'v>(vars: &'v [(&'v str, &'v str)]) -> impl Fn(&str) -> Option<String> + 'v {
        move |name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned())
        }
    }

    #[test]
    fn configure_fails_without_backend() {
        let avr = [
            ("CARGO_CFG_TARGET_ARCH", "avr"),
            ("CARGO_CFG_TARGET_HAS_ATOMIC", "8"),
        ];
        let message = configure(env(&avr)).unwrap_err().to_string();
        assert!(message.contains("`avr`"));
        assert!(message.contains("neither a known fence provider nor pointer-width atomics"));

        let invalid = [
            ("CARGO_CFG_TARGET_ARCH", "x86_64"),
            ("CARGO_CFG_TARGET_HAS_ATOMIC", "8,16,32,64,ptr"),
            (BACKEND_VAR, "cstdatomic"),
        ];
        let message = configure(env(&invalid)).unwrap_err().to_string();
        assert!(message.contains("`cstdatomic`"));

        assert!(configure(env(&[])).is_err());
    }

    #[test]
    fn configure_preference_sources() {
        let x86_64 = [
            ("CARGO_CFG_TARGET_ARCH", "x86_64"),
            ("CARGO_CFG_TARGET_HAS_ATOMIC", "8,16,32,64,ptr"),
        ];
        assert_eq!(
            configure(env(&x86_64)).unwrap(),
            Selection {
                backend: Backend::Fence(FenceKind::Compiler),
                preference: Preference::Auto,
                explicit: false,
            }
        );

        let feature = [x86_64[0], x86_64[1], ("CARGO_FEATURE_NATIVE", "1")];
        assert_eq!(
            configure(env(&feature)).unwrap(),
            Selection {
                backend: Backend::Native,
                preference: Preference::Native,
                explicit: true,
            }
        );

        let overridden = [
            x86_64[0],
            x86_64[1],
            ("CARGO_FEATURE_NATIVE", "1"),
            (BACKEND_VAR, "fence"),
        ];
        let selection = configure(env(&overridden)).unwrap();
        assert_eq!(selection.backend, Backend::Fence(FenceKind::Compiler));
        assert!(selection.explicit);
    }

    #[test]
    fn cfgs_name_one_backend() {
        for backend in [
            Backend::Fence(FenceKind::Compiler),
            Backend::Fence(FenceKind::Hardware),
            Backend::Native,
        ] {
            let backends: Vec<_> = backend
                .cfgs()
                .iter()
                .filter(|(k, _)| *k == "atomic_pointer_backend")
                .collect();
            assert_eq!(backends.len(), 1);
        }
    }
}
