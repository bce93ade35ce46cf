use leptos::prelude::*;
use planarity_canvas::App;

fn main() {
	planarity_canvas::init_logging();

	mount_to_body(|| {
		view! { <App /> }
	})
}
