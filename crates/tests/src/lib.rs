//! # Integration Tests
//!
//! Cross-crate scenarios on the simulated camera bus.
//!
//! Covers:
//! - Config to bindings to running rig
//! - Tick classification, desync and flush over a scripted rig
//! - Capture sampling and export to disk
//! - Shutdown driven from another thread

#[cfg(test)]
mod contract_tests {
    use contracts::{Command, ConfigVersion, Serial};

    #[test]
    fn test_contract_defaults() {
        assert_eq!(ConfigVersion::default(), ConfigVersion::V1);
        assert_eq!(Command::from_key('q'), Some(Command::Quit));
        assert_eq!(
            Serial::from_raw(b"AB12CD34EF56").as_str(),
            "AB12-CD34-EF56"
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::path::Path;
    use std::time::Duration;

    use camera_factory::{
        CameraFactory, CameraFactoryError, MockCameraConfig, MockCameraDriver,
        RetryPolicy, ScriptStep,
    };
    use capture::BmpExporter;
    use config_loader::{BindingResolver, ConfigFormat, ConfigLoader};
    use contracts::{Command, CommandSource, ContractError, ImageFormat, RigConfig};
    use sync_engine::{ExitFlag, Session, SessionState, SyncEngine, SyncEngineConfig, TickOutcome};
    use tempfile::tempdir;

    /// Serials A, B, C with order keys 3, 1, 2; B delivers RGB
    const RIG: &str = r#"
[serials]
"AAAA-0000-000A" = "a"
"AAAA-0000-000B" = "b"
"AAAA-0000-000C" = "c"

[profiles.a]
file = "a.cfg"
order = 3

[profiles.b]
file = "b.cfg"
order = 1
color_mode = "rgb"

[profiles.c]
file = "c.cfg"
order = 2
"#;

    const A: &str = "AAAA-0000-000A";
    const B: &str = "AAAA-0000-000B";
    const C: &str = "AAAA-0000-000C";

    fn rig_config() -> RigConfig {
        ConfigLoader::load_from_str(RIG, ConfigFormat::Toml).unwrap()
    }

    fn camera(rig: &RigConfig, serial: &str) -> MockCameraConfig {
        let profile = &rig.profiles[&rig.serials[serial]];
        MockCameraConfig {
            color_mode: profile.color_mode,
            ..MockCameraConfig::small()
        }
    }

    /// Scripted bus enumerating A, B, C in that order
    fn scripted_driver(rig: &RigConfig, scripts: [Vec<ScriptStep>; 3]) -> MockCameraDriver {
        let [a, b, c] = scripts;
        MockCameraDriver::new()
            .with_scripted_camera(A, camera(rig, A), a)
            .with_scripted_camera(B, camera(rig, B), b)
            .with_scripted_camera(C, camera(rig, C), c)
    }

    fn quick_retry() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            backoff: Duration::ZERO,
        }
    }

    /// Full startup path: scan, bind, open
    fn start(
        rig: &RigConfig,
        driver: MockCameraDriver,
    ) -> Result<(SyncEngine, CameraFactory<MockCameraDriver>), CameraFactoryError> {
        let factory = CameraFactory::new(driver).with_retry(quick_retry());
        let devices = factory.scan()?;
        let bindings = BindingResolver::new(rig, "/rigs").resolve_all(&devices)?;
        let camera_rig = factory.open_rig(&bindings)?;
        Ok((
            SyncEngine::new(camera_rig, SyncEngineConfig::default()),
            factory,
        ))
    }

    struct NoCommands;

    impl CommandSource for NoCommands {
        fn poll(&mut self) -> Option<Command> {
            None
        }
    }

    #[test]
    fn test_binding_order_is_stable() {
        let rig = rig_config();
        let (mut engine, _factory) =
            start(&rig, scripted_driver(&rig, Default::default())).unwrap();

        let order: Vec<&str> = engine
            .rig()
            .handles()
            .iter()
            .map(|h| h.binding().serial.as_str())
            .collect();
        assert_eq!(order, vec![B, C, A]);
        assert_eq!(
            engine.rig().handles()[0].binding().config_path,
            Path::new("/rigs").join("b.cfg")
        );

        for _ in 0..3 {
            let TickOutcome::Complete(set) = engine.tick() else {
                panic!("expected a complete tick");
            };
            // position 0 is always B, the only RGB camera
            assert_eq!(set.get(0).unwrap().format, ImageFormat::Rgb8);
            assert_eq!(set.get(1).unwrap().format, ImageFormat::Gray8);
            assert_eq!(set.get(2).unwrap().format, ImageFormat::Gray8);
        }
    }

    #[test]
    fn test_twelve_unarmed_ticks_buffer_two_sets() {
        let rig = rig_config();
        let dir = tempdir().unwrap();
        let (engine, _factory) = start(&rig, scripted_driver(&rig, Default::default())).unwrap();

        let mut session = Session::new(engine, Box::new(BmpExporter::new(dir.path())), ExitFlag::new())
            .with_tick_limit(12);
        let stats = session.run(&mut NoCommands).clone();

        assert_eq!(stats.ticks_complete, 12);
        let ticks: Vec<u64> = session.workflow().buffered().iter().map(|s| s.tick()).collect();
        assert_eq!(ticks, vec![5, 10]);
        assert!(session.workflow().buffered().iter().all(|s| s.len() == 3));
    }

    #[test]
    fn test_third_camera_timeout_on_seventh_tick() {
        let rig = rig_config();
        // canonical position 2 is A
        let mut a = vec![ScriptStep::Frame; 6];
        a.push(ScriptStep::Timeout);
        let (mut engine, factory) =
            start(&rig, scripted_driver(&rig, [a, Vec::new(), Vec::new()])).unwrap();

        for _ in 0..6 {
            assert!(matches!(engine.tick(), TickOutcome::Complete(_)));
        }
        let streak = engine.state().timeout_streak;
        let b_reads = factory.driver().probe(B).unwrap().calls().reads;

        assert!(matches!(
            engine.tick(),
            TickOutcome::Partial { read: 2, expected: 3 }
        ));
        assert_eq!(engine.state().timeout_streak, streak + 1);
        assert_eq!(engine.state().tick_index, 6);
        assert_eq!(factory.driver().probe(B).unwrap().calls().reads, b_reads + 1);

        let TickOutcome::Complete(set) = engine.tick() else {
            panic!("tick 8 should be unaffected");
        };
        assert_eq!(set.tick(), 7);
    }

    #[test]
    fn test_flush_reaches_every_camera_once() {
        let rig = rig_config();
        let (mut engine, factory) = start(&rig, scripted_driver(&rig, Default::default())).unwrap();
        for _ in 0..4 {
            engine.tick();
        }

        let before: Vec<u32> = [A, B, C]
            .iter()
            .map(|s| factory.driver().probe(s).unwrap().calls().flushes)
            .collect();
        engine.flush_all();

        assert_eq!(engine.state().tick_index, 0);
        for (serial, prior) in [A, B, C].iter().zip(before) {
            assert_eq!(factory.driver().probe(serial).unwrap().calls().flushes, prior + 1);
        }
    }

    #[test]
    fn test_commit_writes_one_batch_per_buffered_set() {
        let rig = rig_config();
        let dir = tempdir().unwrap();
        let (engine, _factory) = start(&rig, scripted_driver(&rig, Default::default())).unwrap();

        /// Arms after tick 1, commits after tick 4, quits after tick 5.
        /// Every tick ends with one poll returning None.
        struct ArmThenCommit(u32);
        impl CommandSource for ArmThenCommit {
            fn poll(&mut self) -> Option<Command> {
                self.0 += 1;
                match self.0 {
                    1 => Some(Command::Arm),
                    5 => Some(Command::Commit),
                    7 => Some(Command::Quit),
                    _ => None,
                }
            }
        }

        let mut session = Session::new(engine, Box::new(BmpExporter::new(dir.path())), ExitFlag::new());
        let stats = session.run(&mut ArmThenCommit(0)).clone();

        // armed after tick 1: ticks 2 to 4 buffered
        assert_eq!(stats.batches_exported, 3);
        assert_eq!(session.workflow().exported_count(), 3);
        assert!(session.workflow().buffered().is_empty());
        for batch in 0..3 {
            for position in 0..3 {
                let path = dir.path().join(format!("image{batch}/camera{position}.bmp"));
                assert!(path.exists(), "missing {}", path.display());
            }
        }
        let decoded = image_dims(&dir.path().join("image0/camera0.bmp"));
        assert_eq!(decoded, (8, 4));
    }

    fn image_dims(path: &Path) -> (u32, u32) {
        let bytes = std::fs::read(path).unwrap();
        // BITMAPINFOHEADER width/height at offsets 18 and 22
        let width = u32::from_le_bytes(bytes[18..22].try_into().unwrap());
        let height = i32::from_le_bytes(bytes[22..26].try_into().unwrap()).unsigned_abs();
        (width, height)
    }

    #[test]
    fn test_unbound_device_is_fatal() {
        let rig = rig_config();
        let driver = scripted_driver(&rig, Default::default())
            .with_camera("AAAA-0000-00FF", MockCameraConfig::small());

        let err = start(&rig, driver).err().expect("expected start to fail");
        assert!(matches!(
            err,
            CameraFactoryError::Contract(ContractError::UnboundDevice { ref serial }) if serial == "AAAA-0000-00FF"
        ));
    }

    #[test]
    fn test_open_failure_is_fatal_after_retries() {
        let rig = rig_config();
        let driver = MockCameraDriver::new()
            .with_camera(A, MockCameraConfig::small())
            .with_camera(
                B,
                MockCameraConfig {
                    open_failures: 5,
                    ..MockCameraConfig::small()
                },
            )
            .with_camera(C, MockCameraConfig::small());

        let err = start(&rig, driver).err().expect("expected start to fail");
        assert!(matches!(
            err,
            CameraFactoryError::Contract(ContractError::CameraOpen { attempts: 3, .. })
        ));
    }

    #[test]
    fn test_control_write_failure_is_not_fatal() {
        let rig = rig_config();
        let driver = MockCameraDriver::new()
            .with_camera(A, MockCameraConfig::small())
            .with_camera(
                B,
                MockCameraConfig {
                    failing_controls: vec!["setAnalogueGain".into()],
                    ..MockCameraConfig::small()
                },
            )
            .with_camera(C, MockCameraConfig::small());

        let (engine, factory) = start(&rig, driver).unwrap();
        assert_eq!(engine.camera_count(), 3);
        let controls = factory.driver().probe(B).unwrap().calls().controls;
        assert_eq!(controls, vec![("setExposureTime".to_string(), 30_000)]);
    }

    #[tokio::test]
    async fn test_exit_flag_from_another_task_releases_cameras() {
        let rig = rig_config();
        let dir = tempdir().unwrap();
        let driver = MockCameraDriver::new()
            .with_camera(A, MockCameraConfig { frequency_hz: 100.0, ..MockCameraConfig::small() })
            .with_camera(B, MockCameraConfig { frequency_hz: 100.0, ..MockCameraConfig::small() })
            .with_camera(C, MockCameraConfig { frequency_hz: 100.0, ..MockCameraConfig::small() });
        let (engine, factory) = start(&rig, driver).unwrap();

        let exit = ExitFlag::new();
        let mut session = Session::new(engine, Box::new(BmpExporter::new(dir.path())), exit.clone());
        let worker = tokio::task::spawn_blocking(move || {
            let stats = session.run(&mut NoCommands).clone();
            (stats, session.state())
        });

        tokio::time::sleep(Duration::from_millis(200)).await;
        exit.trigger();
        let (stats, state) = worker.await.unwrap();

        assert_eq!(state, SessionState::Terminated);
        assert!(stats.ticks_total() > 0);
        for serial in [A, B, C] {
            let calls = factory.driver().probe(serial).unwrap().calls();
            assert_eq!((calls.stops, calls.closes), (1, 1));
        }
        assert!(factory
            .driver()
            .probe(A)
            .is_some_and(|p| p.calls().reads > 0));
    }
}
