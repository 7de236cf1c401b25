use pretty_assertions::assert_eq;

use super::{CpuMask, EventList, PrintOpts};
use crate::catalog::{Catalog, Location};
use crate::config::{Measure, Opts, Proc};
use crate::count::mock::{Call, MockOpen};
use crate::error::Error;
use crate::resolve::Resolver;
use crate::sysfs::fake::FakeSys;
use crate::sysfs::Topology;

// Four CPUs on two sockets, a core PMU and two cbox boxes.
fn fake() -> FakeSys {
    let fake = FakeSys::new();
    fake.cpu_pmu()
        .uncore_pmus("cbox", 2, 20)
        .uncore_pmus("sbox", 3, 30)
        .cpu(0, None, Some(0))
        .cpu(1, Some(true), Some(0))
        .cpu(2, Some(true), Some(1))
        .cpu(3, Some(true), Some(1));
    fake
}

fn list(fake: &FakeSys) -> EventList {
    let sysfs = fake.sysfs();
    let topology = Topology::from_sysfs(&sysfs, 4);
    EventList::with_topology(sysfs, topology)
}

fn parsed(fake: &FakeSys, events: &str) -> EventList {
    let catalog = Catalog::with_location(Location::default());
    let resolver = Resolver::with_sysfs(&catalog, fake.sysfs());
    let mut list = list(fake);
    list.parse(&resolver, events).unwrap();
    list
}

fn find(calls: &[Call], config: u64, cpu: i32) -> Call {
    calls
        .iter()
        .find(|c| c.desc.config == config && c.target.cpu() == cpu)
        .cloned()
        .unwrap_or_else(|| panic!("no open of {:#x} on cpu {}", config, cpu))
}

#[test]
fn test_parse_groups() {
    let fake = fake();
    let list = parsed(&fake, "{cpu-cycles,instructions,r1cd},r2cd:u,{r3cd}");
    assert_eq!(list.len(), 5);

    let flags: Vec<_> = list
        .iter()
        .map(|e| (e.spec(), e.group_leader(), e.end_group(), e.in_group()))
        .collect();
    assert_eq!(
        flags,
        [
            ("cpu-cycles", true, false, true),
            ("instructions", false, false, true),
            ("r1cd", false, true, true),
            ("r2cd:u", false, false, false),
            ("r3cd", true, true, true),
        ]
    );
    assert_eq!(list.get(0).unwrap().descriptor().config, 0x3c);
    assert!(list.get(3).unwrap().descriptor().exclude.kernel);
}

#[test]
fn test_group_syntax() {
    let fake = fake();
    let catalog = Catalog::with_location(Location::default());
    let resolver = Resolver::with_sysfs(&catalog, fake.sysfs());
    let mut list = list(&fake);
    list.parse(&resolver, "r1cd").unwrap();

    for bad in ["{r2cd,{r3cd}}", "r2cd}", "{r2cd,r3cd", "{}", "{r2cd},}", "r2cd,{"] {
        assert!(
            matches!(list.parse(&resolver, bad), Err(Error::GroupSyntax(_))),
            "{}",
            bad
        );
        assert_eq!(list.len(), 1, "{}", bad);
    }
}

#[test]
fn test_parse_rollback() {
    let fake = fake();
    let catalog = Catalog::with_location(Location::default());
    let resolver = Resolver::with_sysfs(&catalog, fake.sysfs());
    let mut list = list(&fake);
    list.parse(&resolver, "r1cd").unwrap();

    assert!(matches!(
        list.parse(&resolver, "r2cd,cbox/event=0x1/,nope/event=1/"),
        Err(Error::NotFound(_))
    ));
    assert_eq!(list.len(), 1);
    assert_eq!(list.get(0).unwrap().spec(), "r1cd");
}

#[test]
fn test_multi_pmu_outside_group() {
    let fake = fake();
    let list = parsed(&fake, "cbox/event=0x1/,r1cd");
    assert_eq!(list.len(), 3);

    let clones: Vec<_> = list
        .iter()
        .map(|e| (e.descriptor().ty, e.origin(), e.clone_count(), e.uncore()))
        .collect();
    assert_eq!(
        clones,
        [(20, None, 1, true), (21, Some(0), 0, true), (4, None, 0, false)]
    );
    let pmu = list.get(1).unwrap().extra().current_pmu().unwrap();
    assert!(pmu.ends_with("uncore_cbox_1"));
}

#[test]
fn test_multi_pmu_lock_step() {
    let fake = fake();
    let list = parsed(&fake, "{cbox/event=0x1/,cbox/event=0x2/}");
    assert_eq!(list.len(), 4);

    let pairs: Vec<_> = list
        .iter()
        .map(|e| {
            let pmu = e.extra().current_pmu().unwrap();
            let pmu = pmu.file_name().unwrap().to_str().unwrap().to_owned();
            (e.descriptor().config, pmu, e.origin())
        })
        .collect();
    assert_eq!(
        pairs,
        [
            (0x1, "uncore_cbox_0".to_owned(), None),
            (0x2, "uncore_cbox_0".to_owned(), None),
            (0x1, "uncore_cbox_1".to_owned(), Some(0)),
            (0x2, "uncore_cbox_1".to_owned(), Some(1)),
        ]
    );
    assert_eq!(list.get(0).unwrap().clone_count(), 1);
    assert_eq!(list.get(1).unwrap().clone_count(), 1);

    let flags: Vec<_> = list
        .iter()
        .map(|e| (e.group_leader(), e.end_group(), e.in_group()))
        .collect();
    assert_eq!(
        flags,
        [
            (true, false, true),
            (false, true, true),
            (true, false, true),
            (false, true, true),
        ]
    );
}

#[test]
fn test_multi_pmu_group_of_one() {
    let fake = fake();
    let mut list = parsed(&fake, "{cbox/event=0x1/},r2cd");
    let flags: Vec<_> = list
        .iter()
        .map(|e| (e.group_leader(), e.end_group(), e.in_group()))
        .collect();
    assert_eq!(
        flags,
        [(true, true, true), (true, true, true), (false, false, false)]
    );

    let opener = MockOpen::default();
    list.setup_with(&opener, &Opts::default()).unwrap();
    let calls = opener.calls();
    // Each box counts as its own group, the trailing event joins none.
    assert!(calls.iter().all(|c| c.group_fd.is_none()));
    assert_eq!(find(&calls, 0x2cd, 0).group_fd, None);
}

#[test]
fn test_group_mixed_pmus() {
    let fake = fake();
    let catalog = Catalog::with_location(Location::default());
    let resolver = Resolver::with_sysfs(&catalog, fake.sysfs());
    let mut list = list(&fake);
    list.parse(&resolver, "r1cd").unwrap();

    for bad in ["{cbox/event=0x1/,r2cd},r3cd", "{r2cd,cbox/event=0x1/}"] {
        assert!(
            matches!(list.parse(&resolver, bad), Err(Error::PmuMismatch(_))),
            "{}",
            bad
        );
        assert_eq!(list.len(), 1, "{}", bad);
    }
}

#[test]
fn test_multi_pmu_mismatch() {
    let fake = fake();
    let catalog = Catalog::with_location(Location::default());
    let resolver = Resolver::with_sysfs(&catalog, fake.sysfs());
    let mut list = list(&fake);
    assert!(matches!(
        list.parse(&resolver, "{cbox/event=0x1/,sbox/event=0x1/}"),
        Err(Error::PmuMismatch(_))
    ));
    assert!(list.is_empty());
}

#[test]
fn test_setup_on_exec() {
    let fake = fake();
    let mut list = parsed(&fake, "{cpu-cycles,instructions},r1cd");
    let opener = MockOpen::default();
    list.setup_with(&opener, &Opts::default()).unwrap();

    let calls = opener.calls();
    assert_eq!(calls.len(), 12);
    for call in &calls {
        assert_eq!(call.target.pid(), 0);
        assert!(call.desc.inherit);
        assert!(call.desc.disabled);
        assert!(call.desc.enable_on_exec);
        assert!(call.desc.read_format.time_enabled);
        assert!(call.desc.read_format.time_running);
    }

    for cpu in 0..4 {
        let leader = find(&calls, 0x3c, cpu);
        let member = find(&calls, 0xc0, cpu);
        let single = find(&calls, 0x1cd, cpu);
        assert_eq!(leader.group_fd, None);
        assert_eq!(member.group_fd, Some(leader.fd));
        assert_eq!(single.group_fd, None);
    }
    assert!(list.iter().all(|e| e.cpus().iter().all(|s| s.counter().is_some())));
}

#[test]
fn test_setup_system() {
    let fake = fake();
    let mut list = parsed(&fake, "r1cd");
    let opener = MockOpen::default();
    let opts = Opts {
        measure: Measure::System,
        ..Default::default()
    };
    list.setup_with(&opener, &opts).unwrap();

    let calls = opener.calls();
    assert_eq!(calls.len(), 4);
    for call in &calls {
        assert_eq!(call.target.pid(), -1);
        assert!(!call.desc.disabled);
        assert!(!call.desc.enable_on_exec);
    }

    let mut list = parsed(&fake, "r1cd");
    let opener = MockOpen::default();
    let opts = Opts {
        measure: Measure::Attach(Proc(4242)),
        ..Default::default()
    };
    list.setup_with(&opener, &opts).unwrap();
    assert!(opener.calls().iter().all(|c| c.target.pid() == 4242));
}

#[test]
fn test_setup_again() {
    let fake = fake();
    let mut list = parsed(&fake, "{cpu-cycles,instructions}");
    list.setup_with(&MockOpen::default(), &Opts::default()).unwrap();
    list.close();

    let opener = MockOpen::default();
    let opts = Opts {
        measure: Measure::System,
        ..Default::default()
    };
    list.setup_with(&opener, &opts).unwrap();
    let calls = opener.calls();
    assert_eq!(calls.len(), 8);
    for call in &calls {
        assert!(!call.desc.disabled);
        assert!(!call.desc.enable_on_exec);
    }
    for cpu in 0..4 {
        let leader = find(&calls, 0x3c, cpu);
        assert_eq!(leader.group_fd, None);
        assert_eq!(find(&calls, 0xc0, cpu).group_fd, Some(leader.fd));
    }
}

#[test]
fn test_setup_uncore() {
    let fake = fake();
    let mut list = parsed(&fake, "{cbox/event=0x1/,cbox/event=0x2/}");
    let opener = MockOpen::default();
    list.setup_with(&opener, &Opts::default()).unwrap();

    let calls = opener.calls();
    assert_eq!(calls.len(), 8);
    let mut cpus: Vec<_> = calls.iter().map(|c| c.target.cpu()).collect();
    cpus.sort();
    cpus.dedup();
    assert_eq!(cpus, [0, 2]);

    for cpu in [0, 2] {
        let opened: Vec<_> = calls.iter().filter(|c| c.target.cpu() == cpu).collect();
        // Leader and member of box 0, then of box 1.
        assert_eq!(opened[0].group_fd, None);
        assert_eq!(opened[1].group_fd, Some(opened[0].fd));
        assert_eq!(opened[2].group_fd, None);
        assert_eq!(opened[3].group_fd, Some(opened[2].fd));
        assert_eq!(opened[2].desc.ty, 21);
    }
}

#[test]
fn test_setup_cpumask() {
    let fake = fake();
    let mut list = parsed(&fake, "r1cd,cbox/event=0x1/");
    let opener = MockOpen::default();
    let opts = Opts {
        cpumask: Some("1-".parse().unwrap()),
        ..Default::default()
    };
    list.setup_with(&opener, &opts).unwrap();

    let opened: Vec<_> = opener
        .calls()
        .iter()
        .map(|c| (c.desc.ty, c.target.cpu()))
        .collect();
    assert_eq!(opened, [(4, 1), (4, 2), (4, 3), (20, 2), (21, 2)]);
}

#[test]
fn test_setup_offline() {
    let fake = fake();
    fake.cpu(3, Some(false), Some(1));
    let mut list = parsed(&fake, "r1cd");
    let opener = MockOpen {
        offline: vec![3],
        ..Default::default()
    };
    list.setup_with(&opener, &Opts::default()).unwrap();

    let event = list.get(0).unwrap();
    assert!(event.cpus()[2].counter().is_some());
    assert!(event.cpus()[3].counter().is_none());
}

#[test]
fn test_setup_failures() {
    let fake = fake();

    // Partial failure still succeeds.
    let mut list = parsed(&fake, "r1cd");
    let opener = MockOpen {
        denied: vec![1],
        ..Default::default()
    };
    list.setup_with(&opener, &Opts::default()).unwrap();
    assert!(list.get(0).unwrap().cpus()[1].counter().is_none());

    // EINVAL on an online CPU is a real failure.
    let mut list = parsed(&fake, "r1cd");
    let opener = MockOpen {
        offline: vec![0, 1, 2, 3],
        ..Default::default()
    };
    match list.setup_with(&opener, &Opts::default()) {
        Err(Error::Open { event, cpu, source }) => {
            assert_eq!(event, "r1cd");
            assert_eq!(cpu, 3);
            assert_eq!(source.raw_os_error(), Some(libc::EINVAL));
        }
        other => panic!("{:?}", other),
    }

    let mut list = self::list(&fake);
    assert!(matches!(
        list.setup_with(&MockOpen::default(), &Opts::default()),
        Err(Error::NoCounters)
    ));
}

#[test]
fn test_read_scaled() {
    let fake = fake();
    let mut list = parsed(&fake, "r1cd,cbox/event=0x1/");
    let opener = MockOpen {
        values: |desc, target| match desc.ty {
            4 => [100 * (target.cpu() as u64 + 1), 200, 100],
            ty => [ty as u64, 10, 10],
        },
        ..Default::default()
    };
    list.setup_with(&opener, &Opts::default()).unwrap();
    list.read_all().unwrap();

    assert_eq!(list.scaled_value(0, 0), 200);
    assert_eq!(list.scaled_value(0, 3), 800);
    assert_eq!(list.get(0).unwrap().cpus()[3].stat().count, 400);

    assert_eq!(list.scaled_value(1, 2), 20);
    assert_eq!(list.scaled_value(2, 2), 21);
    assert_eq!(list.scaled_value_sum(1, 2), 41);
    assert_eq!(list.scaled_value_sum(1, 1), 0);

    assert_eq!(list.scaled_value(7, 0), 0);
    assert_eq!(list.scaled_value_sum(7, 0), 0);
}

#[test]
fn test_read_failure() {
    let fake = fake();
    let mut list = parsed(&fake, "r1cd");
    list.setup_with(&MockOpen::default(), &Opts::default()).unwrap();
    list.read_all().unwrap();
    // Every mock file is exhausted after one read.
    assert!(matches!(list.read_all(), Err(Error::Read { cpu: 3, .. })));
    assert_eq!(list.scaled_value(0, 0), 200);
}

#[test]
fn test_control() {
    let fake = fake();
    let mut list = parsed(&fake, "r1cd");
    list.enable().unwrap();

    // Mock counters are plain files, the kernel rejects the ioctl.
    list.setup_with(&MockOpen::default(), &Opts::default()).unwrap();
    assert!(matches!(list.disable(), Err(Error::Ioctl { cpu: 3, .. })));

    list.close();
    list.disable().unwrap();
}

#[test]
fn test_close() {
    let fake = fake();
    let mut list = parsed(&fake, "r1cd,r2cd");
    list.setup_with(&MockOpen::default(), &Opts::default()).unwrap();

    list.close_event(0);
    assert!(list.get(0).unwrap().cpus().iter().all(|s| s.counter().is_none()));
    assert!(list.get(1).unwrap().cpus().iter().all(|s| s.counter().is_some()));

    list.close();
    list.close();
    list.close_event(9);
    assert!(list.iter().all(|e| e.cpus().iter().all(|s| s.counter().is_none())));
    list.read_all().unwrap();
}

#[test]
fn test_print() {
    let fake = fake();
    let mut list = parsed(&fake, "cpu/event=0x3c,name=cycles/,cbox/event=0x1/");
    let opener = MockOpen {
        values: |desc, _| match desc.ty {
            4 => [10, 200, 100],
            _ => [5, 10, 10],
        },
        ..Default::default()
    };
    list.setup_with(&opener, &Opts::default()).unwrap();
    list.read_all().unwrap();

    let mut out = vec![];
    let opts = PrintOpts {
        prefix: "> ",
        merge: true,
    };
    list.print_aggr(&mut out, &opts).unwrap();
    let out = String::from_utf8(out).unwrap();
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        format!("> {:<30} {:>15} [50.00%]", "cycles", 80)
    );
    assert_eq!(lines[1], format!("> {:<30} {:>15}", "cbox/event=0x1/", 20));

    let mut out = vec![];
    list.print_per_cpu(&mut out, &PrintOpts::default()).unwrap();
    let out = String::from_utf8(out).unwrap();
    assert_eq!(out.lines().count(), 4 + 2 + 2);
    assert!(out.starts_with(&format!("  0 {:<30} {:>15} [50.00%]\n", "cycles", 20)));
}

#[test]
fn test_cpumask() {
    let mask: CpuMask = "0,2-3,8-".parse().unwrap();
    for (cpu, expected) in [(0, true), (1, false), (2, true), (3, true), (4, false), (8, true), (100, true)] {
        assert_eq!(mask.contains(cpu), expected, "{}", cpu);
    }
    assert_eq!(mask.to_string(), "0,2-3,8-");

    for bad in ["", "a", "3-1", "1,,2", "-3"] {
        assert!(matches!(bad.parse::<CpuMask>(), Err(Error::CpuMask(_))), "{}", bad);
    }
}

#[test]
fn test_print_long_running() {
    let fake = fake();
    let mut list = parsed(&fake, "r1cd");
    let opener = MockOpen {
        values: |_, _| [1, u64::MAX, u64::MAX / 2],
        ..Default::default()
    };
    list.setup_with(&opener, &Opts::default()).unwrap();
    list.read_all().unwrap();

    // Times summed over four CPUs saturate instead of wrapping.
    let mut out = vec![];
    list.print_aggr(&mut out, &PrintOpts::default()).unwrap();
    let out = String::from_utf8(out).unwrap();
    assert_eq!(out, format!("{:<30} {:>15}\n", "r1cd", 8));
}
