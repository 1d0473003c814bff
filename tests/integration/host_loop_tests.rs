//! End-to-end tests over the host adapters: mock pins → HardwareAdapter →
//! AppService → HttpUplink / NvsAdapter simulations.

use soilsense::adapters::nvs::NvsAdapter;
use soilsense::app::persistence;
use soilsense::app::ports::ConfigPort;
use soilsense::config::SystemConfig;
use soilsense::fsm::StateId;
use soilsense::fsm::context::CalibrationReadings;

use crate::mock_hw::HostNode;

fn calibrate(node: &mut HostNode, dry: u16, wet: u16) {
    node.press(2500);
    node.set_soil(dry);
    node.press(200);
    node.set_soil(wet);
    node.press(200);
    node.press(200);
}

#[test]
fn calibration_is_posted_and_saved() {
    let mut node = HostNode::boot(NvsAdapter::new());
    calibrate(&mut node, 3050, 1380);

    assert_eq!(node.app.state(), StateId::Idle);
    let reqs = node.uplink.sim_requests();
    assert_eq!(reqs.len(), 1);
    assert!(reqs[0].url.ends_with("/calibrate"));
    assert_eq!(
        reqs[0].body,
        r#"{"id":"DE:AD:BE:EF:CA:FE","dry":3050,"wet":1380}"#
    );

    // The loop persisted the readings in the same pass.
    assert!(!node.app.is_readings_dirty());
    assert_eq!(
        persistence::load_readings(&node.nvs),
        Ok(CalibrationReadings { dry: 3050, wet: 1380 })
    );
}

#[test]
fn reboot_restores_calibration() {
    let mut node = HostNode::boot(NvsAdapter::new());
    calibrate(&mut node, 2900, 1200);
    let nvs = std::mem::replace(&mut node.nvs, NvsAdapter::new());
    drop(node);

    let node = HostNode::boot(nvs);
    assert_eq!(
        node.app.readings(),
        CalibrationReadings { dry: 2900, wet: 1200 }
    );
}

#[test]
fn led_follows_calibration_cadence() {
    let mut node = HostNode::boot(NvsAdapter::new());
    node.press(2500);
    assert_eq!(node.app.led_interval_ms(), 100);

    let before = node.led.borrow().len();
    node.run_for(1000);
    // 100 ms half-period: about ten edges per second.
    let edges = node.led.borrow().len() - before;
    assert!((9..=11).contains(&edges), "{} edges", edges);
}

fn nvs_with_interval(interval_ms: u32) -> NvsAdapter {
    let nvs = NvsAdapter::new();
    nvs.save(&SystemConfig {
        telemetry_interval_ms: interval_ms,
        ..SystemConfig::default()
    })
    .unwrap();
    nvs
}

#[test]
fn telemetry_skips_the_network_while_wifi_is_down() {
    let mut node = HostNode::boot(nvs_with_interval(5_000));
    node.set_soil(2222);
    node.wifi.sim_set_ap_reachable(false);
    node.run_for(5_010);
    assert!(node.uplink.sim_requests().is_empty());

    // The second reconnect attempt (t = 6 s) lands before the next window.
    node.wifi.sim_set_ap_reachable(true);
    node.run_for(5_010);
    let reqs = node.uplink.sim_requests();
    assert_eq!(reqs.len(), 1);
    assert!(reqs[0].url.ends_with("/telemetry"));
    assert_eq!(
        reqs[0].body,
        r#"{"sensor_id":"DE:AD:BE:EF:CA:FE","raw_value":2222}"#
    );
}

#[test]
fn stored_config_drives_the_telemetry_interval() {
    let mut node = HostNode::boot(nvs_with_interval(5_000));
    node.run_for(15_100);
    assert_eq!(node.uplink.sim_requests().len(), 3);
}
