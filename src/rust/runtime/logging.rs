// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//==============================================================================
// Imports
//==============================================================================

use ::flexi_logger::Logger;
use ::std::sync::Once;

//==============================================================================
// Static Variables
//==============================================================================

/// Guardian to the logging initialize function.
static INIT_LOG: Once = Once::new();

//==============================================================================
// Standalone Functions
//==============================================================================

/// Initializes logging features. The log specification is taken from `RUST_LOG`, falling back to warnings only.
pub fn initialize() {
    INIT_LOG.call_once(|| {
        match Logger::try_with_env_or_str("warn").and_then(|logger| logger.start()) {
            // The handle must outlive the program, otherwise the logger is torn down with it.
            Ok(handle) => ::std::mem::forget(handle),
            Err(e) => eprintln!("initialize(): failed to start logger ({:?})", e),
        }
    });
}
