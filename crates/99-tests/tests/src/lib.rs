//! Cross-crate replay and determinism suites for the world domains.

#[cfg(test)]
mod autonomy_replay;

#[cfg(test)]
mod hazard_replay;

#[cfg(test)]
mod properties;

#[cfg(test)]
mod support {
    use autonomy::AutonomySurfaceDesc;
    use domain_fixtures::Fixture;
    use hazard::HazardSurfaceDesc;
    use std::path::{Path, PathBuf};

    pub fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    pub fn fixtures_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn load(name: &str) -> Fixture {
        let path = fixtures_dir().join(name);
        domain_fixtures::load(&path).unwrap_or_else(|err| panic!("failed to load {path:?}: {err}"))
    }

    pub fn autonomy_fixture(name: &str) -> AutonomySurfaceDesc {
        match load(name) {
            Fixture::Autonomy(desc) => desc,
            other => panic!("{name} is a {} fixture", other.kind()),
        }
    }

    pub fn hazard_fixture(name: &str) -> HazardSurfaceDesc {
        match load(name) {
            Fixture::Hazard(desc) => desc,
            other => panic!("{name} is a {} fixture", other.kind()),
        }
    }
}
