use super::SampleOn;
use crate::event::Descriptor;
use crate::ffi::Attr;

/// Lays out a descriptor as the `perf_event_attr` handed to the kernel.
pub(crate) fn from(desc: &Descriptor) -> Attr {
    let mut attr = Attr {
        size: desc.size.as_size(),
        type_: desc.ty,
        config: desc.config,
        read_format: desc.read_format.as_read_format(),
        ..Default::default()
    };
    attr.__bindgen_anon_3.config1 = desc.config1;
    attr.__bindgen_anon_4.config2 = desc.config2;

    let ex = &desc.exclude;
    let bits: [(bool, fn(&mut Attr, u64)); 10] = [
        (ex.user, Attr::set_exclude_user),
        (ex.kernel, Attr::set_exclude_kernel),
        (ex.hv, Attr::set_exclude_hv),
        (ex.host, Attr::set_exclude_host),
        (ex.guest, Attr::set_exclude_guest),
        (ex.idle, Attr::set_exclude_idle),
        (desc.pinned, Attr::set_pinned),
        (desc.inherit, Attr::set_inherit),
        (desc.disabled, Attr::set_disabled),
        (desc.enable_on_exec, Attr::set_enable_on_exec),
    ];
    for (on, set) in bits {
        set(&mut attr, on as u64);
    }

    match desc.sample_on {
        SampleOn::Freq(hz) => {
            attr.set_freq(1);
            attr.__bindgen_anon_1.sample_freq = hz;
        }
        SampleOn::Count(n) => attr.__bindgen_anon_1.sample_period = n,
    }
    attr.set_precise_ip(desc.precise_ip.min(3) as u64);

    attr
}
