use crate::app::console::Console;
use crate::app::{self, AppConfig};

pub mod benchmark;

/** Return type for App modules that go through multiple steps
 *
 * An App module might go through multiple distinct steps to eventually fulfill its task. A step may
 * finish without errors but still not obtain what the next step needs to proceed, e.g., there are no
 * nameservers to benchmark. `Partial` then carries the `ExitStatus` to return early with.
 */
pub enum Partial<T> {
    Next(T),
    ExitStatus(app::ExitStatus),
}

/** Pass environment like configs and console access from step to step
 */
pub struct Environment<'a, T> {
    pub app_config: &'a AppConfig,
    pub mod_config: &'a T,
    pub console: Console,
}

impl<'a, T> Environment<'a, T> {
    pub fn new(app_config: &'a AppConfig, mod_config: &'a T, console: Console) -> Environment<'a, T> {
        Environment {
            app_config,
            mod_config,
            console,
        }
    }
}
