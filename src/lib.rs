//! # Rokka Img
//!
//! Renders responsive HTML `<img>` tags for images served through the
//! [Rokka](https://rokka.io) image CDN. Given an image URL and the site's
//! storage configuration, the renderer emits a tag whose `srcset` points at
//! one CDN resize endpoint per configured width, with a `sizes` expression
//! telling the browser which one to pick. When the CDN is not (or not fully)
//! configured, the renderer degrades to a plain tag instead of failing.
//!
//! # Architecture
//!
//! Control flow is a single linear ladder: validate the inputs, resolve the
//! active storage backend, fill in image-configuration defaults, build the
//! markup. There is no state between calls; every render is a pure function
//! of `(image URL, options, configuration)`.
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading and validation, storage backend resolution, image-configuration normalization |
//! | [`generate`] | The tag renderer — fallback ladder, Rokka URL construction, srcset assembly |
//!
//! # Design Decisions
//!
//! ## Never Break the Page
//!
//! The renderer is called mid-template, where a thrown error cannot be
//! recovered into sensible output. So no input combination errors or panics:
//! a missing image URL renders nothing, any configuration gap renders a
//! plain `<img>` tag, and only a complete backend configuration renders the
//! responsive tag. Every degraded path logs one warning with its reason so
//! operators can spot misconfiguration without readers ever seeing a broken
//! page.
//!
//! ## Maud for Markup
//!
//! The responsive tag is built with [Maud](https://maud.lambda.xyz/), so
//! attribute values are escaped at the interpolation sites and the result is
//! a typed [`maud::Markup`] value. Host templates splice it verbatim; the
//! type is the "already escaped, do not escape again" marker.
//!
//! ## Immutable Resolved Configuration
//!
//! `image_configuration` tables in `config.toml` may be partial; each unset
//! field falls back to a stock default independently. Normalization happens
//! through [`config::ImageConfiguration::resolve`], which produces a fresh
//! immutable value instead of patching the shared configuration in place.
//! Repeated renders therefore see identical settings, with no first-call
//! initialization order to reason about.

pub mod config;
pub mod generate;
