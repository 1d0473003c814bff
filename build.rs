fn main() {
    println!("cargo:rerun-if-env-changed=WIFI_SSID");
    println!("cargo:rerun-if-env-changed=WIFI_PASS");
    println!("cargo:rerun-if-env-changed=SERVER_URL");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
