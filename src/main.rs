fn main() -> anyhow::Result<()> {
    #[cfg(feature = "cpal-audio")]
    wingman::audio::capture::suppress_audio_warnings();

    wingman::cli::run()
}
