/////////////////////////////////////////////////////////////////////////////////////////////
//
// Reproduces a cubic monomial on a non-uniform 2D grid and prints the patch test report.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use ferreus_mls::{
    progress::{closure_sink, format_message, ProgressMsg},
    AxisCoordinates, MlsReconstructor, MlsSettings,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Five unevenly spaced nodes per axis, each scaled by its longest adjacent edge
    let axis = AxisCoordinates::new(
        vec![0.0, 0.1, 0.5, 1.0, 1.3],
        vec![0.1, 0.4, 0.5, 0.5, 0.3],
    );

    // Cubic Chebyshev basis in 2D. One particle per basis term in each cell,
    // tested against x0^2 * x1^1.
    let settings = MlsSettings::builder(2, 3, axis).verbose(true).build()?;

    // Print progress as it arrives, skipping the per-node counters
    let (sink, listener) = closure_sink(256, |msg| {
        if !matches!(msg, ProgressMsg::NodeProgress { .. }) {
            println!("{}", format_message(&msg));
        }
    });

    let reconstructor = MlsReconstructor::builder(settings)
        .progress_callback(sink)
        .build()?;

    let report = reconstructor.patch_test()?;

    drop(reconstructor);
    let _ = listener.join();

    println!("{report}");
    println!("Max error: {:e}", report.max_error());

    Ok(())
}
