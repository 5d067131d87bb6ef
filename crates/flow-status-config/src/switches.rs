//! Boolean command-line switches.
//!
//! clap reports an absent `SetTrue` flag as `false`, which would mask file
//! and environment values. The boolean fields are kept off the
//! `ortho_config` command line and these switches are applied after the
//! layered load instead.

use std::ffi::OsString;

use ortho_config::{OrthoConfig, OrthoResult};

use crate::Config;

/// A boolean switch. Switches never take a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    /// `--restart-server`
    RestartServer,
    /// `--no-restart-server`
    NoRestartServer,
    /// `--quiet-success`
    QuietSuccess,
}

impl Switch {
    /// Every switch, in help order.
    pub const ALL: [Self; 3] = [Self::RestartServer, Self::NoRestartServer, Self::QuietSuccess];

    /// The flag as typed on the command line.
    pub const fn flag(self) -> &'static str {
        match self {
            Self::RestartServer => "--restart-server",
            Self::NoRestartServer => "--no-restart-server",
            Self::QuietSuccess => "--quiet-success",
        }
    }

    /// Looks up the switch spelled `flag`.
    pub fn from_flag(flag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|switch| switch.flag() == flag)
    }

    fn apply(self, config: &mut Config) {
        match self {
            Self::RestartServer => config.restart_server = true,
            Self::NoRestartServer => config.restart_server = false,
            Self::QuietSuccess => config.quiet_success = true,
        }
    }
}

impl Config {
    /// Loads layered configuration from `args`, then applies any switches
    /// among them in order, so the last of `--restart-server` and
    /// `--no-restart-server` wins.
    ///
    /// # Errors
    ///
    /// Returns the `ortho_config` error when a layer fails to load or an
    /// argument is not recognised.
    pub fn load_with_switches<I, T>(args: I) -> OrthoResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut forwarded: Vec<OsString> = Vec::new();
        let mut switches = Vec::new();
        for argument in args {
            let argument = argument.into();
            match argument.to_str().and_then(Switch::from_flag) {
                Some(switch) => switches.push(switch),
                None => forwarded.push(argument),
            }
        }

        let mut config = Self::load_from_iter(forwarded)?;
        for switch in switches {
            switch.apply(&mut config);
        }
        Ok(config)
    }
}
