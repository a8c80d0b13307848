use vrutwin_core::facility::FacilityProfile;
use vrutwin_core::twin::IntakePath;
use vrutwin_core::view::SimulationSnapshot;

pub fn print_catalog(profiles: &[FacilityProfile]) {
    for p in profiles {
        println!(
            "{:<8} {:<18} {:>5.1} L/s  {}",
            p.key, p.display_name, p.recovery_rate_lps, p.description
        );
    }
}

pub fn print_summary(snap: &SimulationSnapshot) {
    println!("Session      {}", snap.session_id);
    println!("Facility     {}", snap.facility.profile().display_name);
    println!("Elapsed      {:.1} s", snap.elapsed_ms as f64 / 1000.0);
    println!("Recovered    {:.2} L", snap.liters_recovered);
    println!("Revenue      ${:.2}", snap.revenue_generated);
    println!("CO2 avoided  {:.2} kg", snap.emissions_prevented);
    println!("Pulses       {}", snap.pulse_count);
    println!(
        "Truck        {:?} at ({:.1}, {:.1}, {:.1})",
        snap.truck_state, snap.truck_position.x, snap.truck_position.y, snap.truck_position.z
    );
    for (path, rate) in IntakePath::ALL.iter().zip(snap.intake_emission_rates) {
        println!("  {:<14} {:>6.1} particles/s", format!("{:?}", path), rate);
    }
    if !snap.recent_log.is_empty() {
        println!("Log");
        for line in &snap.recent_log {
            println!("  [{:>7.1}s] {}", line.at_ms as f64 / 1000.0, line.message);
        }
    }
}
