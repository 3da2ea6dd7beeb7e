/// Initializes the logging system.
///
/// Reads appender configuration from `log4rs.yaml`; call once at startup.
///
/// # Errors
/// Propagates configuration-file and initialization failures.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    log4rs::init_file("log4rs.yaml", Default::default())?;
    Ok(())
}
