// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from invalid baseline sensitivities.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NoiseError {
    #[error("SEFDs must be finite and non-negative, but got {sefd} Jy")]
    BadSefd { sefd: f64 },

    #[error("Bandwidth must be finite and positive, but got {bandwidth} Hz")]
    BadBandwidth { bandwidth: f64 },

    #[error("Integration time must be finite and positive, but got {time} s")]
    BadIntegrationTime { time: f64 },

    #[error("Correlator efficiency must be in (0, 1], but got {efficiency}")]
    BadEfficiency { efficiency: f64 },

    #[error("These sensitivities give a thermal noise of {sigma} Jy; it must be finite")]
    NonFiniteSigma { sigma: f64 },

    #[error("These sensitivities give a thermal noise of {sigma} Jy; non-zero noise must be at least 1.5e-154 Jy")]
    TinySigma { sigma: f64 },
}
