use pretty_assertions::assert_eq;

use super::fake::FakeSys;
use super::Topology;

#[test]
fn test_pmu_files() {
    let fake = FakeSys::new();
    fake.cpu_pmu().uncore_pmus("cbox", 2, 20);
    let sysfs = fake.sysfs();

    let cpu = sysfs.pmu_dir("cpu");
    assert_eq!(sysfs.pmu_type(&cpu).unwrap(), 4);
    assert_eq!(
        sysfs.format(&cpu, "umask").unwrap().as_deref(),
        Some("config:8-15\n")
    );
    assert_eq!(sysfs.format(&cpu, "nope").unwrap(), None);
    assert!(sysfs.event_alias(&cpu, "cpu-cycles").unwrap().is_some());

    assert!(!sysfs.is_uncore(&cpu));
    assert!(sysfs.is_uncore(&sysfs.pmu_dir("uncore_cbox_1")));

    let mut pmus = sysfs.pmus().unwrap();
    pmus.sort();
    assert_eq!(pmus, ["cpu", "uncore_cbox_0", "uncore_cbox_1"]);
}

#[test]
fn test_has_cpu_event() {
    let fake = FakeSys::new();
    fake.cpu_pmu();
    let sysfs = fake.sysfs();
    assert!(sysfs.has_cpu_event("cpu-cycles"));
    assert!(!sysfs.has_cpu_event("inst_retired.any"));
    assert!(!sysfs.has_cpu_event(".."));
    assert!(!sysfs.has_cpu_event("../type"));
    assert!(!sysfs.has_cpu_event(""));
}

#[test]
fn test_cpu_online() {
    let fake = FakeSys::new();
    fake.cpu(0, None, Some(0))
        .cpu(1, Some(true), Some(0))
        .cpu(2, Some(false), None);
    let sysfs = fake.sysfs();
    assert!(sysfs.cpu_online(0));
    assert!(sysfs.cpu_online(1));
    assert!(!sysfs.cpu_online(2));
}

#[test]
fn test_topology() {
    let fake = FakeSys::new();
    fake.cpu(0, None, Some(0))
        .cpu(1, Some(true), Some(1))
        .cpu(2, Some(true), Some(0))
        .cpu(3, Some(true), Some(1));
    let topology = Topology::from_sysfs(&fake.sysfs(), 4);
    assert_eq!(topology.num_cpus, 4);
    assert_eq!(topology.socket_cpus, [0, 1]);
    assert_eq!(topology.num_sockets(), 2);
}

#[test]
fn test_topology_unknown() {
    let fake = FakeSys::new();
    let topology = Topology::from_sysfs(&fake.sysfs(), 2);
    assert_eq!(topology.socket_cpus, [0]);
}
