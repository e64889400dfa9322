/////////////////////////////////////////////////////////////////////////////////////////////
//
// Reconstructs a linear function at the nodes of a three node 1D grid.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use ferreus_mls::{
    progress::StdoutSink, AxisCoordinates, MlsReconstructor, MlsSettings, ParticleExclusion,
    TestPolynomial,
};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Three nodes at 0, 1 and 2 with unit spacing
    let axis = AxisCoordinates::uniform(0.0, 2.0, 3);

    // Linear basis, with particles in both cells
    let settings = MlsSettings::builder(1, 1, axis)
        .particles_per_cell(8)
        .particle_exclusion(ParticleExclusion::None)
        .seed(42)
        .build()?;

    let reconstructor = MlsReconstructor::builder(settings)
        .progress_callback(Arc::new(StdoutSink))
        .build()?;

    // Solve once, then reconstruct P(x) = x from the particle values
    let solutions = reconstructor.solve()?;
    let polynomial = TestPolynomial::new(vec![1]);
    let values = reconstructor.reconstruct(&polynomial, &solutions);

    for (node, value) in values.iter().enumerate() {
        let x = reconstructor.grid.node_coordinates(node);
        match value {
            Some(value) => println!("node {node} at x = {:.1}: Ur = {value:.12}", x[0]),
            None => println!("node {node} at x = {:.1}: unresolved", x[0]),
        }
    }

    Ok(())
}
