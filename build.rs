fn main() {
    // ESP-IDF environment is only needed for the on-target binary; host
    // builds (lib + tests) skip it entirely.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
