use super::Opts;
use crate::event::EventConfig;
use crate::ffi::Attr;

pub(crate) fn from(event_cfg: EventConfig, opts: &Opts) -> Attr {
    let mut attr = Attr {
        size: size_of::<Attr>() as _,
        ..Default::default()
    };

    // event config:

    attr.type_ = event_cfg.ty;
    attr.config = event_cfg.config;

    // count config:

    if opts.exclude_hv {
        attr.set_exclude_hv(1);
    }
    attr.read_format = opts.stat_format.as_read_format();

    // Enabled once per window by the sampler.
    attr.set_disabled(1);

    attr
}
