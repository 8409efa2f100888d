fn main() {
    // macOS: the SMS driver interface in IOKit is only exercised on 10.15+ builds.
    #[cfg(target_os = "macos")]
    println!("cargo:rustc-env=MACOSX_DEPLOYMENT_TARGET=10.15");

    println!("cargo:rerun-if-env-changed=SMSLIB_DIR");

    // The native SMSLib is supplied out of tree; only link it when asked to.
    if std::env::var_os("CARGO_FEATURE_NATIVE").is_some() {
        let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
        if target_os != "macos" {
            println!("cargo:warning=feature `native` has no effect outside macOS");
            return;
        }
        if let Some(dir) = std::env::var_os("SMSLIB_DIR") {
            println!("cargo:rustc-link-search=native={}", dir.to_string_lossy());
        } else {
            println!("cargo:warning=SMSLIB_DIR is not set; relying on the default search path");
        }
        println!("cargo:rustc-link-lib=static=smslib");
        println!("cargo:rustc-link-lib=framework=IOKit");
        println!("cargo:rustc-link-lib=framework=CoreFoundation");
    }
}
