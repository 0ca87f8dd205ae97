use approx::assert_relative_eq;
use braid_core::{FieldId, Observer, State};
use braid_coupling::{
    BlackBodyEmitter,
    driver::{Action, Event, Status},
};
use braid_observers::{Recorder, TemperatureCeiling};
use integration_tests::{Plate, couple, emitter_config, kelvin_of};
use uom::si::{f64::Time, thermodynamic_temperature::kelvin, time::second};

fn hot_spot(plate: &Plate) -> braid_heat::HeatSolver<braid_heat::Heat2dKernel> {
    let mut solver = plate.kernel_solver(kelvin_of(293.0)).unwrap();
    for (i, j) in [(40, 40), (40, 41), (70, 20)] {
        solver.set_temperature(i, j, kelvin_of(393.0)).unwrap();
    }
    solver
}

#[test]
fn idle_emitter_matches_direct_evolution() {
    let plate = Plate::copper(100);
    let tend = plate.timestep() * 100.0;

    let mut reference = hot_spot(&plate);
    reference.evolve_model(tend).unwrap();

    let mut driver = couple(&plate, hot_spot(&plate), emitter_config(&plate, 0.0, 0.0)).unwrap();
    let solution = driver.run_unobserved(tend).unwrap();

    assert_eq!(solution.status, Status::Complete);
    assert_eq!(solution.cycles, 100);

    let coupled = driver.primary().grid().unwrap().field(FieldId::Temperature).unwrap();
    let direct = reference.grid().unwrap().field(FieldId::Temperature).unwrap();
    assert_eq!(coupled.values(), direct.values());

    let secondary = driver.secondary().grid().field(FieldId::Temperature).unwrap();
    assert_eq!(secondary.values(), direct.values());
}

#[test]
fn uniform_plate_stays_uniform_without_sources() {
    let plate = Plate::copper(100);
    let solver = plate.kernel_solver(kelvin_of(293.0)).unwrap();
    let mut driver = couple(&plate, solver, emitter_config(&plate, 0.0, 0.0)).unwrap();

    driver.run_unobserved(plate.timestep() * 100.0).unwrap();

    let field = driver.primary().grid().unwrap().field(FieldId::Temperature).unwrap();
    assert!(field.values().iter().all(|&t| t == 293.0));
}

#[test]
fn diffusion_conserves_heat() {
    let plate = Plate::copper(100);
    let solver = hot_spot(&plate);
    let before = solver.grid().unwrap().field(FieldId::Temperature).unwrap().sum();
    let mut driver = couple(&plate, solver, emitter_config(&plate, 0.0, 0.0)).unwrap();

    driver.run_unobserved(plate.timestep() * 50.0).unwrap();

    let field = driver.primary().grid().unwrap().field(FieldId::Temperature).unwrap();
    assert_relative_eq!(field.sum(), before, max_relative = 1e-12);
    assert!(field.max() < 393.0);
}

#[test]
fn heater_adds_its_energy_to_the_plate() {
    let plate = Plate::copper(20);
    let solver = plate.kernel_solver(kelvin_of(293.0)).unwrap();
    let before = solver.grid().unwrap().field(FieldId::Temperature).unwrap().sum();
    let mut driver = couple(&plate, solver, emitter_config(&plate, 80.0, 0.0)).unwrap();
    let per_step = driver.secondary().heating_per_step();

    let solution = driver.run_unobserved(plate.timestep() * 10.0).unwrap();
    assert_eq!(solution.cycles, 10);

    // Two heater steps per cycle, each warming four cells.
    let field = driver.primary().grid().unwrap().field(FieldId::Temperature).unwrap();
    assert_relative_eq!(
        field.sum() - before,
        10.0 * 2.0 * 4.0 * per_step,
        max_relative = 1e-9
    );
    assert!(field.max() > 293.0);
    assert_relative_eq!(field.min(), 293.0, max_relative = 1e-9);
}

#[test]
fn radiating_plate_cools_toward_the_room() {
    let plate = Plate::copper(10);
    let solver = plate.kernel_solver(kelvin_of(400.0)).unwrap();
    let mut driver = couple(&plate, solver, emitter_config(&plate, 0.0, 1.0)).unwrap();

    let mut recorder = Recorder::new();
    driver
        .run(plate.timestep() * 20.0, |event: &Event<'_>| -> Option<Action> {
            Observer::<_, Action>::observe(&mut recorder, event)
        })
        .unwrap();

    let samples = recorder.samples();
    assert_eq!(samples.len(), 20);
    assert!(samples[0].max_temperature.get::<kelvin>() < 400.0);
    assert!(
        samples
            .windows(2)
            .all(|pair| pair[1].mean_temperature <= pair[0].mean_temperature)
    );
    assert!(samples.iter().all(|s| s.total_emission.is_some()));
    assert!(samples[19].mean_temperature.get::<kelvin>() > 293.0);
}

#[test]
fn ceiling_stops_a_heated_run() {
    let plate = Plate::copper(10);
    let solver = plate.kernel_solver(kelvin_of(293.0)).unwrap();
    let mut driver = couple(&plate, solver, emitter_config(&plate, 80.0, 1.0)).unwrap();

    let mut ceiling = TemperatureCeiling::new(kelvin_of(300.0));
    let solution = driver
        .run(plate.timestep() * 1000.0, |event: &Event<'_>| -> Option<Action> {
            Observer::<_, Action>::observe(&mut ceiling, event)
        })
        .unwrap();

    assert_eq!(solution.status, Status::StoppedByObserver);
    assert!(solution.cycles < 1000);
    assert_eq!(driver.cycles(), solution.cycles);
    let hottest = driver.primary().grid().unwrap().field(FieldId::Temperature).unwrap().max();
    assert!(hottest >= 300.0);
}

#[test]
fn zero_length_run_changes_nothing() {
    let plate = Plate::copper(10);
    let solver = hot_spot_small(&plate);
    let before = solver.grid().unwrap().clone();
    let mut driver = couple(&plate, solver, emitter_config(&plate, 80.0, 1.0)).unwrap();

    let solution = driver.run_unobserved(Time::new::<second>(0.0)).unwrap();

    assert_eq!(solution.cycles, 0);
    assert_eq!(solution.status, Status::Complete);
    assert_eq!(driver.primary().grid().unwrap(), &before);
    assert_eq!(driver.primary().model_time().unwrap().get::<second>(), 0.0);
}

#[test]
fn solver_shuts_down_after_a_run() {
    let plate = Plate::copper(10);
    let solver = plate.kernel_solver(kelvin_of(293.0)).unwrap();
    let mut driver = couple(&plate, solver, emitter_config(&plate, 80.0, 0.0)).unwrap();
    driver.run_unobserved(plate.timestep() * 3.0).unwrap();

    let (mut solver, emitter) = driver.into_parts();
    assert_relative_eq!(
        solver.model_time().unwrap().get::<second>(),
        emitter.model_time().get::<second>(),
        max_relative = 1e-12
    );

    solver.shutdown().unwrap();
    assert_eq!(solver.state(), State::Stopped);
    assert!(solver.grid().is_err());
}

#[test]
fn two_half_steps_heat_the_block_by_the_full_step_formula() {
    let plate = Plate::copper(10);
    let solver = plate.kernel_solver(kelvin_of(293.0)).unwrap();
    let mut emitter =
        BlackBodyEmitter::new(solver.grid().unwrap().clone(), emitter_config(&plate, 80.0, 0.0))
            .unwrap();

    let dt = plate.timestep();
    emitter.evolve_model(dt / 2.0).unwrap();
    emitter.evolve_model(dt).unwrap();

    let config = emitter.config();
    let rise = (dt * config.heating_power).value
        / (config.heat_capacity * 4.0 * emitter.cell_mass()).value;

    for (i, j) in solver.grid().unwrap().cells() {
        let t = emitter.grid().temperature(i, j).unwrap().get::<kelvin>();
        if (5..=6).contains(&i) && (5..=6).contains(&j) {
            assert_relative_eq!(t, 293.0 + rise, max_relative = 1e-12);
        } else {
            assert_eq!(t, 293.0);
        }
    }
}

fn hot_spot_small(plate: &Plate) -> braid_heat::HeatSolver<braid_heat::Heat2dKernel> {
    let mut solver = plate.kernel_solver(kelvin_of(293.0)).unwrap();
    solver.set_temperature(3, 4, kelvin_of(350.0)).unwrap();
    solver
}
