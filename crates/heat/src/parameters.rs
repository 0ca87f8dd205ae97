use braid_core::{Descriptor, ParameterSet, Value, units::thermal_diffusivity};
use uom::si::{
    f64::{Length, Time},
    length::meter,
    time::second,
};

/// Parameters registered by the heat solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeatParameter {
    /// Thermal diffusivity.
    Alpha,
    /// Number of cells in the x direction.
    NgridX,
    /// Number of cells in the y direction.
    NgridY,
    /// Uniform cell size.
    Cellsize,
    /// Internal step of the diffusion kernel.
    Timestep,
}

impl ParameterSet for HeatParameter {
    const ALL: &'static [Self] = &[
        HeatParameter::Alpha,
        HeatParameter::NgridX,
        HeatParameter::NgridY,
        HeatParameter::Cellsize,
        HeatParameter::Timestep,
    ];

    fn descriptor(self) -> Descriptor {
        match self {
            HeatParameter::Alpha => Descriptor {
                name: "alpha",
                description: "thermal diffusivity",
                default: Value::Diffusivity(thermal_diffusivity(0.01)),
                locked_after_commit: false,
            },
            HeatParameter::NgridX => Descriptor {
                name: "Ngrid_x",
                description: "grid size x direction",
                default: Value::Count(100),
                locked_after_commit: true,
            },
            HeatParameter::NgridY => Descriptor {
                name: "Ngrid_y",
                description: "grid size y direction",
                default: Value::Count(100),
                locked_after_commit: true,
            },
            HeatParameter::Cellsize => Descriptor {
                name: "cellsize",
                description: "grid cell size (uniform)",
                default: Value::Length(Length::new::<meter>(0.1)),
                locked_after_commit: true,
            },
            HeatParameter::Timestep => Descriptor {
                name: "timestep",
                description: "timestep used by the code",
                default: Value::Time(Time::new::<second>(0.01)),
                locked_after_commit: false,
            },
        }
    }
}
