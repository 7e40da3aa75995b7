fn main() {
    println!("cargo:rerun-if-env-changed=CITONPHYDE_SERVER_URL");
    println!("cargo:rerun-if-env-changed=CITONPHYDE_AP_NAME");

    // Host builds (tests, simulation) have no ESP-IDF environment to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
