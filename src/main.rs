use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use qthkit::config::Config;
use qthkit::doppler::{calculate_doppler, FrequencyPlan};
use qthkit::locator::{locator_bounds, to_lat_lon, to_locator, LocatorPrecision};
use qthkit::los::{analyze, radio_horizon_km, ElevationPoint, LinkParams};
use qthkit::predict::{load_file, predict_passes_for_days, GroundStation, Pass, PassOptions};
use qthkit::rf::antenna::{dipole_leg_length_m, dipole_length_m, quarter_wave_vertical_m};
use qthkit::rf::coax::power_after_loss_w;
use qthkit::rf::swr::swr_from_power;
use qthkit::rf::{cable_by_id, calculate_cable_loss, MatchReport, YagiDesign, CABLES};

#[derive(Parser)]
#[command(name = "qthkit")]
#[command(about = "Ham radio station toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a coordinate as a Maidenhead locator
    Encode {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lon: f64,
        /// Locator length, 4 or 6
        #[arg(short, long, default_value_t = 6)]
        precision: u8,
    },
    /// Decode a locator to the centre of its cell
    Decode { locator: String },
    /// Distance and bearing between two locators
    Distance { from: String, to: String },
    /// Feedline loss, or the cable catalogue when no cable is given
    Cable {
        id: Option<String>,
        #[arg(short, long)]
        frequency: Option<f64>,
        #[arg(short, long)]
        length: Option<f64>,
        /// Input power in watts
        #[arg(short, long)]
        power: Option<f64>,
    },
    /// Dipole, vertical and Yagi dimensions
    Antenna {
        /// Frequency in MHz
        frequency: f64,
        /// Yagi element count
        #[arg(short, long)]
        elements: Option<usize>,
    },
    /// Match figures from an SWR reading or forward/reflected power
    Swr {
        swr: Option<f64>,
        #[arg(long, requires = "reflected")]
        forward: Option<f64>,
        #[arg(long, requires = "forward")]
        reflected: Option<f64>,
    },
    /// Line of sight over a terrain profile (YAML or JSON list of samples)
    Los {
        profile: PathBuf,
        #[arg(long)]
        tx_height: f64,
        #[arg(long)]
        rx_height: f64,
        /// Frequency in MHz
        #[arg(short, long)]
        frequency: f64,
    },
    /// Doppler shift for a range rate in km/s
    Doppler {
        #[arg(allow_hyphen_values = true)]
        range_rate: f64,
        #[arg(long)]
        uplink: Option<f64>,
        #[arg(long)]
        downlink: Option<f64>,
    },
    /// Predict passes from a TLE file
    Passes {
        #[arg(long)]
        tle: PathBuf,
        /// "lat,lon" or a locator
        #[arg(long, allow_hyphen_values = true)]
        location: String,
        #[arg(long, default_value_t = 0.0)]
        altitude: f64,
        #[arg(long, default_value_t = 2)]
        days: u32,
        #[arg(long, default_value_t = 0.0)]
        min_elevation: f64,
        #[arg(long)]
        norad_id: Option<u32>,
        /// Downlink in MHz for per-point Doppler
        #[arg(long)]
        downlink: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Run the HTTP API
    Serve {
        #[arg(short, long)]
        config: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            lat,
            lon,
            precision,
        } => encode(lat, lon, precision),
        Commands::Decode { locator } => decode(&locator),
        Commands::Distance { from, to } => distance(&from, &to),
        Commands::Cable {
            id,
            frequency,
            length,
            power,
        } => cable(id.as_deref(), frequency, length, power),
        Commands::Antenna {
            frequency,
            elements,
        } => antenna(frequency, elements),
        Commands::Swr {
            swr,
            forward,
            reflected,
        } => match_report(swr, forward, reflected),
        Commands::Los {
            profile,
            tx_height,
            rx_height,
            frequency,
        } => los(
            &profile,
            LinkParams {
                tx_height_m: tx_height,
                rx_height_m: rx_height,
                frequency_mhz: frequency,
            },
        ),
        Commands::Doppler {
            range_rate,
            uplink,
            downlink,
        } => doppler(range_rate, uplink, downlink),
        Commands::Passes {
            tle,
            location,
            altitude,
            days,
            min_elevation,
            norad_id,
            downlink,
            json,
        } => passes(PassesArgs {
            tle,
            location,
            altitude,
            days,
            min_elevation,
            norad_id,
            downlink,
            json,
        }),
        Commands::Serve { config } => serve(&config),
    }
}

fn fail(message: impl std::fmt::Display) -> ExitCode {
    eprintln!("Error: {}", message);
    ExitCode::FAILURE
}

fn encode(lat: f64, lon: f64, precision: u8) -> ExitCode {
    let precision = match LocatorPrecision::try_from(precision) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    match to_locator(lat, lon, precision) {
        Ok(locator) => {
            println!("{}", locator);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn decode(locator: &str) -> ExitCode {
    let (Some(center), Some((sw, ne))) = (to_lat_lon(locator), locator_bounds(locator)) else {
        return fail(format!("invalid locator: {}", locator));
    };
    println!("centre: {:.5}, {:.5}", center.latitude, center.longitude);
    println!(
        "cell:   {:.5}, {:.5} .. {:.5}, {:.5}",
        sw.latitude, sw.longitude, ne.latitude, ne.longitude
    );
    ExitCode::SUCCESS
}

fn distance(from: &str, to: &str) -> ExitCode {
    let Some(a) = to_lat_lon(from) else {
        return fail(format!("invalid locator: {}", from));
    };
    let Some(b) = to_lat_lon(to) else {
        return fail(format!("invalid locator: {}", to));
    };
    println!("{:.1} km, bearing {:.1}°", a.distance_km(&b), a.bearing_deg(&b));
    ExitCode::SUCCESS
}

fn cable(
    id: Option<&str>,
    frequency: Option<f64>,
    length: Option<f64>,
    power: Option<f64>,
) -> ExitCode {
    let Some(id) = id else {
        for c in CABLES {
            println!(
                "{:<10} {:<12} {:>4.0} Ω  VF {:.2}  {:>5.2} mm",
                c.id, c.name, c.impedance_ohms, c.velocity_factor, c.outer_diameter_mm
            );
        }
        return ExitCode::SUCCESS;
    };

    let Some(cable) = cable_by_id(id) else {
        return fail(format!("unknown cable: {}", id));
    };
    let (Some(frequency), Some(length)) = (frequency, length) else {
        return fail("--frequency and --length are required");
    };

    let loss = calculate_cable_loss(cable, frequency, length);
    println!(
        "{}: {:.2} dB/100m at {} MHz, {:.2} dB over {} m",
        cable.name,
        cable.loss_per_100m_db(frequency),
        frequency,
        loss,
        length
    );
    if let Some(power) = power {
        println!("{} W in, {:.1} W out", power, power_after_loss_w(power, loss));
    }
    ExitCode::SUCCESS
}

fn antenna(frequency: f64, elements: Option<usize>) -> ExitCode {
    println!("half-wave dipole:      {:.3} m", dipole_length_m(frequency));
    println!("dipole leg:            {:.3} m", dipole_leg_length_m(frequency));
    println!("quarter-wave vertical: {:.3} m", quarter_wave_vertical_m(frequency));

    let Some(count) = elements else {
        return ExitCode::SUCCESS;
    };
    let design = match YagiDesign::new(frequency, count) {
        Ok(d) => d,
        Err(e) => return fail(e),
    };
    println!(
        "\n{}-element Yagi: boom {:.3} m, {:.1} dBd / {:.1} dBi",
        count, design.boom_length_m, design.gain_dbd, design.gain_dbi
    );
    for element in &design.elements {
        println!(
            "  {:<4} length {:.3} m at {:.3} m",
            element.role.to_string(),
            element.length_m,
            element.position_m
        );
    }
    ExitCode::SUCCESS
}

fn match_report(swr: Option<f64>, forward: Option<f64>, reflected: Option<f64>) -> ExitCode {
    let swr = match (swr, forward, reflected) {
        (Some(swr), _, _) => swr,
        (None, Some(f), Some(r)) => swr_from_power(f, r),
        _ => return fail("give an SWR reading or --forward and --reflected"),
    };
    let Some(report) = MatchReport::from_swr(swr) else {
        return fail(format!("SWR must be at least 1, got {}", swr));
    };
    println!("SWR:               {:.2}", report.swr);
    println!("reflection coeff:  {:.3}", report.reflection_coefficient);
    println!("return loss:       {:.2} dB", report.return_loss_db);
    println!("mismatch loss:     {:.3} dB", report.mismatch_loss_db);
    println!("reflected power:   {:.1} %", report.reflected_power_fraction * 100.0);
    ExitCode::SUCCESS
}

fn los(profile_path: &Path, link: LinkParams) -> ExitCode {
    let content = match fs::read_to_string(profile_path) {
        Ok(c) => c,
        Err(e) => return fail(format!("reading {}: {}", profile_path.display(), e)),
    };
    let profile: Vec<ElevationPoint> = match serde_yaml::from_str(&content) {
        Ok(p) => p,
        Err(e) => return fail(format!("parsing profile: {}", e)),
    };

    let analysis = analyze(&profile, &link);
    println!(
        "{}: {:.1} km at {:.1}°, worst clearance {:.1} m ({:.0}% of F1), FSPL {:.1} dB",
        analysis.status,
        analysis.total_distance_km,
        analysis.bearing_deg,
        analysis.worst_clearance_m,
        analysis.worst_fresnel_pct,
        analysis.free_space_loss_db
    );
    println!(
        "radio horizon: {:.1} km",
        radio_horizon_km(link.tx_height_m, link.rx_height_m)
    );
    ExitCode::SUCCESS
}

fn doppler(range_rate: f64, uplink: Option<f64>, downlink: Option<f64>) -> ExitCode {
    let shift = calculate_doppler(uplink, downlink, range_rate);
    if let (Some(hz), Some(mhz)) = (shift.uplink_shift_hz, shift.uplink_corrected_mhz) {
        println!("uplink:   {:+.1} Hz -> {:.6} MHz", hz, mhz);
    }
    if let (Some(hz), Some(mhz)) = (shift.downlink_shift_hz, shift.downlink_corrected_mhz) {
        println!("downlink: {:+.1} Hz -> {:.6} MHz", hz, mhz);
    }
    println!(
        "{} at {:.3} km/s",
        if shift.approaching {
            "approaching"
        } else {
            "receding"
        },
        range_rate.abs()
    );
    ExitCode::SUCCESS
}

struct PassesArgs {
    tle: PathBuf,
    location: String,
    altitude: f64,
    days: u32,
    min_elevation: f64,
    norad_id: Option<u32>,
    downlink: Option<f64>,
    json: bool,
}

fn passes(args: PassesArgs) -> ExitCode {
    let Some(station) = GroundStation::from_coordinates(&args.location, Some(args.altitude))
    else {
        return fail(format!("invalid location: {}", args.location));
    };
    let satellites = match load_file(&args.tle) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let options = PassOptions {
        min_elevation_deg: args.min_elevation,
        frequencies: FrequencyPlan::from_mhz(None, args.downlink),
        ..PassOptions::default()
    };
    let start = Utc::now();

    let mut all_passes: Vec<Pass> = Vec::new();
    for sat in satellites
        .iter()
        .filter(|s| args.norad_id.map_or(true, |id| s.info.norad_id == id))
    {
        match predict_passes_for_days(&station, sat, start, args.days, &options) {
            Ok(passes) => all_passes.extend(passes),
            Err(e) => log::warn!("Failed to predict passes for {}: {}", sat.info.name, e),
        }
    }
    all_passes.sort_by_key(|p| p.aos);

    if args.json {
        return match serde_json::to_string_pretty(&all_passes) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => fail(e),
        };
    }

    for pass in &all_passes {
        println!(
            "{:<24} {}  {:>4}s  max {:>5.1}° @ {:>5.1}°  {}{}",
            pass.satellite,
            pass.aos.format("%Y-%m-%d %H:%M:%S"),
            pass.duration_seconds,
            pass.max_elevation_deg,
            pass.max_elevation_azimuth_deg,
            pass.quality,
            if pass.visible { "  visible" } else { "" }
        );
    }
    ExitCode::SUCCESS
}

fn serve(path: &str) -> ExitCode {
    let config = match Config::from_file(path) {
        Ok(c) => c,
        Err(e) => return fail(format!("loading config: {}", e)),
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => return fail(e),
    };

    match runtime.block_on(qthkit::web::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}
